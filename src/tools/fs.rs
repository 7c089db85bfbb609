//! Filesystem tools.
//!
//! Every function returns a plain result string; expected I/O failures are
//! folded into descriptive error text rather than raised.

const READ_FILE_MAX_BYTES: usize = 65_536;

/// Truncate to a byte budget without splitting a UTF-8 codepoint.
pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut cutoff = max_bytes;
    while cutoff > 0 && !s.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    s[..cutoff].to_string()
}

/// Create a folder (and any missing parents).
pub async fn create_folder(path: &str) -> String {
    match tokio::fs::create_dir_all(path).await {
        Ok(()) => format!("Folder created: {path}"),
        Err(e) => format!("Error creating folder: {e}"),
    }
}

/// Create a file with the given content.
pub async fn create_file(path: &str, content: &str) -> String {
    match tokio::fs::write(path, content).await {
        Ok(()) => format!("File created: {path}"),
        Err(e) => format!("Error creating file: {e}"),
    }
}

/// Overwrite a file with the given content.
pub async fn write_to_file(path: &str, content: &str) -> String {
    match tokio::fs::write(path, content).await {
        Ok(()) => format!("Content written to file: {path}"),
        Err(e) => format!("Error writing to file: {e}"),
    }
}

/// Read a file as UTF-8 text, capped to keep the transcript bounded.
pub async fn read_file(path: &str) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            if content.len() > READ_FILE_MAX_BYTES {
                let mut s = truncate_utf8(&content, READ_FILE_MAX_BYTES);
                s.push_str("\n... (truncated)");
                s
            } else {
                content
            }
        }
        Err(e) => format!("Error reading file: {e}"),
    }
}

/// List directory entries as newline-joined names.
pub async fn list_files(path: &str) -> String {
    let mut read_dir = match tokio::fs::read_dir(path).await {
        Ok(rd) => rd,
        Err(e) => return format!("Error listing files: {e}"),
    };

    let mut names = Vec::new();
    loop {
        match read_dir.next_entry().await {
            Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
            Ok(None) => break,
            Err(e) => return format!("Error listing files: {e}"),
        }
    }
    names.sort();
    names.join("\n")
}
