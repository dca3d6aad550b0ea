pub const OPEN_TAG: &str = "file_path";
pub const CLOSE_TAG: &str = "file_path_end";

/// Appends one file block:
///
/// ```text
/// \n<file_path>PATH</file_path>\n
/// CONTENT
/// \n<file_path_end>PATH</file_path_end>\n
/// ```
///
/// `content` is copied verbatim.
pub fn write_tagged_block(out: &mut Vec<u8>, path: &str, content: &[u8]) {
    out.extend_from_slice(format!("\n<{0}>{1}</{0}>\n", OPEN_TAG, path).as_bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(format!("\n<{0}>{1}</{0}>\n", CLOSE_TAG, path).as_bytes());
}
