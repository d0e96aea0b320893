//! Whole-file reading and path string helpers.
//!
//! Reading fails softly: open/metadata/read/allocation errors are logged and
//! reported as an empty buffer, never as a panic. Shader construction relies
//! on this — a missing source file turns into an empty source string whose
//! compilation then fails through the ordinary recoverable path.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::error;

use crate::buffer::FixedBuffer;

/// Reads the whole file at `path` into a [`FixedBuffer`].
///
/// With `null_terminate` the result is `file_size + 1` bytes whose final
/// byte is `\0`, for handing the text to APIs that expect C strings. Any
/// failure returns an empty buffer.
pub fn read_all(path: impl AsRef<Path>, null_terminate: bool) -> FixedBuffer<u8> {
    let path = path.as_ref();
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("failed to open {}: {e}", path.display());
            return FixedBuffer::new();
        }
    };
    let size = match file.metadata() {
        Ok(meta) => meta.len() as usize,
        Err(e) => {
            error!("failed to stat {}: {e}", path.display());
            return FixedBuffer::new();
        }
    };
    let total = if null_terminate { size + 1 } else { size };
    let mut buffer = FixedBuffer::<u8>::alloc(total);
    if buffer.len() != total {
        error!(
            "could not allocate {total} bytes to read {}",
            path.display()
        );
        return FixedBuffer::new();
    }
    if let Err(e) = file.read_exact(&mut buffer[..size]) {
        error!("failed to read {}: {e}", path.display());
        return FixedBuffer::new();
    }
    if null_terminate {
        buffer[size] = 0;
    }
    buffer
}

/// Reads the whole file at `path` as text. Failures are logged and yield an
/// empty string.
pub fn read_to_string(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            error!("failed to read {}: {e}", path.display());
            String::new()
        }
    }
}

/// Unifies `/` and `\` separators to `/` and squeezes runs of separators
/// into one.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_is_slash = false;
    for c in path.chars() {
        if c == '/' || c == '\\' {
            if !last_is_slash {
                out.push('/');
            }
            last_is_slash = true;
        } else {
            last_is_slash = false;
            out.push(c);
        }
    }
    out
}

/// The final path component, without any directory part.
pub fn file_name(path: &str) -> String {
    let npath = normalize(path);
    match npath.rfind('/') {
        Some(pos) => npath[pos + 1..].to_string(),
        None => npath,
    }
}

/// The normalized path with its extension (final `.suffix`) removed.
pub fn file_stem(path: &str) -> String {
    let npath = normalize(path);
    match npath.rfind('.') {
        Some(pos) => npath[..pos].to_string(),
        None => npath,
    }
}

/// The extension after the final dot, or an empty string.
pub fn extension(path: &str) -> String {
    let npath = normalize(path);
    match npath.rfind('.') {
        Some(pos) => npath[pos + 1..].to_string(),
        None => String::new(),
    }
}

/// The directory part of the path, without the trailing slash. Empty when
/// the path has no directory component.
pub fn parent_dir(path: &str) -> String {
    let npath = normalize(path);
    match npath.rfind('/') {
        Some(pos) => npath[..pos].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("glslkit_fileio_{name}_{}", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_read_all_missing_file_is_empty() {
        let buf = read_all("/nonexistent/glslkit/shader.vert", true);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_read_all_null_terminated() {
        let path = fixture("nul", b"void main() {}");
        let buf = read_all(&path, true);
        assert_eq!(buf.len(), 15);
        assert_eq!(&buf[..14], b"void main() {}");
        assert_eq!(buf[14], 0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_read_all_exact_size() {
        let path = fixture("raw", b"abc");
        let buf = read_all(&path, false);
        assert_eq!(buf.as_slice(), b"abc");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_read_to_string_missing_file_is_empty() {
        assert_eq!(read_to_string("/nonexistent/glslkit/x.glsl"), "");
    }

    #[test]
    fn test_normalize_unifies_separators() {
        assert_eq!(normalize("a\\b//c\\\\d"), "a/b/c/d");
        assert_eq!(normalize("plain"), "plain");
    }

    #[test]
    fn test_path_components() {
        assert_eq!(file_name("shaders\\pbr/main.frag"), "main.frag");
        assert_eq!(file_stem("shaders/main.frag"), "shaders/main");
        assert_eq!(extension("shaders/main.frag"), "frag");
        assert_eq!(extension("noext"), "");
        assert_eq!(parent_dir("shaders/pbr/main.frag"), "shaders/pbr");
        assert_eq!(parent_dir("main.frag"), "");
    }
}
