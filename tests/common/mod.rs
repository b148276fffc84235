//! Shared helpers for integration tests: fake artifact bytes and fake
//! analysis-tool scripts.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

/// A minimal artifact in the external tool's wire shape: a header message
/// (field 1) carrying version, repository name, and begin/end timestamps,
/// followed by an opaque contents blob (field 2).
pub fn fake_artifact_bytes(begin: i64) -> Vec<u8> {
    let mut header = Vec::new();
    header.push(0x08); // field 1 (version), varint
    encode_varint(2, &mut header);
    let repo = b"test/repo";
    header.push(0x1a); // field 3 (repository), length-delimited
    encode_varint(repo.len() as u64, &mut header);
    header.extend_from_slice(repo);
    header.push(0x20); // field 4 (begin_unix_time), varint
    encode_varint(begin as u64, &mut header);
    header.push(0x28); // field 5 (end_unix_time), varint
    encode_varint(begin as u64 + 1_000, &mut header);

    let mut out = Vec::new();
    out.push(0x0a); // field 1 (header), length-delimited
    encode_varint(header.len() as u64, &mut out);
    out.extend_from_slice(&header);

    let contents = [0xde, 0xad, 0xbe, 0xef];
    out.push(0x12); // field 2 (contents), length-delimited
    encode_varint(contents.len() as u64, &mut out);
    out.extend_from_slice(&contents);
    out
}

/// Write a fake artifact with the given begin timestamp.
pub fn write_artifact(path: &Path, begin: i64) {
    std::fs::write(path, fake_artifact_bytes(begin)).unwrap();
}

/// Write an executable shell script `name` under `dir` and return its path.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fake analysis tool that always succeeds: logs its arguments (one line per
/// invocation) and emits a valid artifact on stdout.
#[cfg(unix)]
pub fn fake_tool_ok(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let template = dir.join("template.pb");
    write_artifact(&template, 1_500_000_000);
    let log = dir.join("invocations.log");
    let tool = write_script(
        dir,
        "fake-tool",
        &format!(
            "echo \"$@\" >> {}\ncat {}",
            log.display(),
            template.display()
        ),
    );
    (tool, log, template)
}

/// Fake repository directory containing one file of `size` bytes.
pub fn fake_repo(root: &Path, name: &str, size: usize) -> PathBuf {
    let repo = root.join(name);
    std::fs::create_dir_all(&repo).unwrap();
    std::fs::write(repo.join("content.bin"), vec![0u8; size]).unwrap();
    repo
}
