use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

use super::{CacheKey, HashAlgorithm};

/// A command line together with every input declared to affect its result.
///
/// The fingerprint is computed from the fields in a fixed order: command
/// tokens, texts, then each file path followed by its contents, then each
/// environment variable name followed by its current value. Fields are
/// concatenated without separators, so `["ab", "c"]` and `["a", "bc"]`
/// produce the same key.
///
/// Tokens are kept as `OsString` and hashed by their raw bytes, so
/// arguments that are not valid UTF-8 still get a stable key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub command: Vec<OsString>,
    pub texts: Vec<OsString>,
    pub env_names: Vec<OsString>,
    pub file_paths: Vec<PathBuf>,
}

impl CommandDescriptor {
    pub fn new<I, T>(command: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<OsString>) -> Self {
        self.texts.push(text.into());
        self
    }

    pub fn with_env(mut self, name: impl Into<OsString>) -> Self {
        self.env_names.push(name.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Compute the cache key from the current file contents and environment.
    pub fn fingerprint(&self, algorithm: HashAlgorithm) -> Result<CacheKey> {
        let mut hasher = algorithm.hasher();
        self.write_to(&mut hasher)?;
        let key = CacheKey::from_digest(hasher);
        debug!(
            "Fingerprint ({}) for `{}`: {}",
            algorithm,
            command_line(&self.command),
            key
        );
        Ok(key)
    }

    /// Stream the fingerprint input into `sink`, reading the process environment.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        self.write_to_with(sink, |name| std::env::var_os(name))
    }

    /// Stream the fingerprint input into `sink`, resolving variables through `env`.
    ///
    /// An unset variable contributes nothing beyond its name, which makes it
    /// indistinguishable from a variable set to the empty string.
    pub fn write_to_with<W, F>(&self, sink: &mut W, env: F) -> Result<()>
    where
        W: Write,
        F: Fn(&OsStr) -> Option<OsString>,
    {
        for token in &self.command {
            sink.write_all(token.as_encoded_bytes())?;
        }
        for text in &self.texts {
            sink.write_all(text.as_encoded_bytes())?;
        }
        for path in &self.file_paths {
            sink.write_all(path.as_os_str().as_encoded_bytes())?;
            let mut file = File::open(path).map_err(|source| Error::Dependency {
                path: path.clone(),
                source,
            })?;
            io::copy(&mut file, sink).map_err(|source| Error::Dependency {
                path: path.clone(),
                source,
            })?;
        }
        for name in &self.env_names {
            sink.write_all(name.as_encoded_bytes())?;
            if let Some(value) = env(name) {
                sink.write_all(value.as_encoded_bytes())?;
            }
        }
        Ok(())
    }
}

/// Space-joined command line for log lines and error messages.
pub fn command_line(command: &[OsString]) -> String {
    command
        .iter()
        .map(|token| token.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn key(descriptor: &CommandDescriptor) -> CacheKey {
        descriptor.fingerprint(HashAlgorithm::default()).unwrap()
    }

    fn key_with_env(
        descriptor: &CommandDescriptor,
        algorithm: HashAlgorithm,
        vars: &[(&str, &str)],
    ) -> String {
        let vars: HashMap<OsString, OsString> = vars
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect();
        let mut hasher = algorithm.hasher();
        descriptor
            .write_to_with(&mut hasher, |name| vars.get(name).cloned())
            .unwrap();
        CacheKey::from_digest(hasher).to_string()
    }

    fn bytes_with_env(descriptor: &CommandDescriptor, vars: &[(&str, &str)]) -> Vec<u8> {
        let mut sink = Vec::new();
        descriptor
            .write_to_with(&mut sink, |name| {
                vars.iter()
                    .find(|(k, _)| OsStr::new(k) == name)
                    .map(|(_, v)| OsString::from(v))
            })
            .unwrap();
        sink
    }

    #[test]
    fn test_empty_descriptor_hashes_empty_input() {
        let descriptor = CommandDescriptor::default();
        assert_eq!(key(&descriptor).as_str(), EMPTY_SHA1);
        assert_eq!(
            descriptor.fingerprint(HashAlgorithm::Sha256).unwrap().as_str(),
            EMPTY_SHA256
        );
    }

    #[test]
    fn test_text_hash() {
        let descriptor = CommandDescriptor::default().with_text("Hello, World!");
        assert_eq!(
            key(&descriptor).as_str(),
            "0a0a9f2a6772942557ab5355d76af442f8f65e01"
        );
        assert_eq!(
            descriptor.fingerprint(HashAlgorithm::Sha256).unwrap().as_str(),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn test_text_changes_key_and_is_deterministic() {
        let a = CommandDescriptor::new(["ls"]).with_text("one");
        let b = CommandDescriptor::new(["ls"]).with_text("two");

        assert_eq!(key(&a), key(&a.clone()));
        assert_ne!(key(&a), key(&b));
    }

    #[test]
    fn test_algorithms_give_different_keys() {
        let descriptor = CommandDescriptor::new(["ls"]);
        let sha1 = descriptor.fingerprint(HashAlgorithm::Sha1).unwrap();
        let sha256 = descriptor.fingerprint(HashAlgorithm::Sha256).unwrap();

        assert_eq!(sha1.as_str().len(), 40);
        assert_eq!(sha256.as_str().len(), 64);
        assert_ne!(sha1, sha256);
    }

    #[test]
    fn test_env_hash() {
        let descriptor = CommandDescriptor::default().with_env("LD_LIBRARY_PATH");
        let vars = [("LD_LIBRARY_PATH", "/usr/local/lib:/usr/lib")];
        assert_eq!(
            key_with_env(&descriptor, HashAlgorithm::Sha1, &vars),
            "3d0fcf9d8dac962ba44dae6b205b541075451732"
        );
        assert_eq!(
            key_with_env(&descriptor, HashAlgorithm::Sha256, &vars),
            "ad2fea2724ae63edb634b3abc0243313ab02b51974277398a616cb0a3f780589"
        );
    }

    #[test]
    fn test_env_unset_matches_empty_value() {
        let descriptor = CommandDescriptor::default().with_env("LD_LIBRARY_PATH");

        let unset = key_with_env(&descriptor, HashAlgorithm::Sha1, &[]);
        let empty = key_with_env(&descriptor, HashAlgorithm::Sha1, &[("LD_LIBRARY_PATH", "")]);
        let set = key_with_env(&descriptor, HashAlgorithm::Sha1, &[("LD_LIBRARY_PATH", "/usr/lib")]);

        assert_eq!(unset, empty);
        assert_ne!(unset, set);
        assert_eq!(unset, "31a999d2e445df6d94c2d10d2f899c4b7a408247");
        assert_eq!(
            key_with_env(&descriptor, HashAlgorithm::Sha256, &[]),
            "259c42d8533e5f10e54f49decdd1221c977a7e1767b12c8e13cc3d6d58fb0280"
        );
    }

    #[test]
    fn test_file_hash_covers_path_and_contents() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("testfile");
        std::fs::write(&path, "Hello, World!")?;

        let descriptor = CommandDescriptor::default().with_file(&path);
        let mut expected = HashAlgorithm::Sha1.hasher();
        expected.write_all(path.as_os_str().as_encoded_bytes())?;
        expected.write_all(b"Hello, World!")?;

        assert_eq!(key(&descriptor), CacheKey::from_digest(expected));
        Ok(())
    }

    #[test]
    fn test_file_contents_change_key() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("prog.h");
        std::fs::write(&path, "Hello, World!")?;

        let descriptor = CommandDescriptor::new(["cc"]).with_file(&path);
        let before = key(&descriptor);
        assert_eq!(before, key(&descriptor));

        std::fs::write(&path, "Goodbye, World!")?;
        let after = key(&descriptor);
        assert_ne!(before, after);

        Ok(())
    }

    #[test]
    fn test_missing_file_is_dependency_error() {
        let descriptor = CommandDescriptor::default().with_file("/nonexistent/cmd-cache/dep.txt");
        match descriptor.fingerprint(HashAlgorithm::Sha1) {
            Err(Error::Dependency { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/cmd-cache/dep.txt"));
            }
            other => panic!("expected dependency error, got {other:?}"),
        }
    }

    #[test]
    fn test_byte_sequence_has_no_delimiters() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("input.txt");
        std::fs::write(&path, "CONTENTS")?;

        let descriptor = CommandDescriptor::new(["sh", "-c", "echo hi"])
            .with_text("t1")
            .with_text("t2")
            .with_file(&path)
            .with_env("SET_VAR")
            .with_env("UNSET_VAR");

        let mut expected = b"sh-cecho hit1t2".to_vec();
        expected.extend_from_slice(path.as_os_str().as_encoded_bytes());
        expected.extend_from_slice(b"CONTENTS");
        expected.extend_from_slice(b"SET_VARvalueUNSET_VAR");

        assert_eq!(bytes_with_env(&descriptor, &[("SET_VAR", "value")]), expected);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_tokens_are_hashed_raw() {
        use std::os::unix::ffi::OsStrExt;

        let latin1 = OsStr::from_bytes(b"caf\xe9");
        let descriptor = CommandDescriptor::new([OsStr::new("echo"), latin1])
            .with_text(latin1)
            .with_env(latin1);

        assert_eq!(
            bytes_with_env(&descriptor, &[]),
            b"echocaf\xe9caf\xe9caf\xe9".to_vec()
        );
        let other = CommandDescriptor::new([OsStr::new("echo"), OsStr::from_bytes(b"caf\xe8")])
            .with_text(latin1)
            .with_env(latin1);
        assert_ne!(key(&descriptor), key(&other));
        assert_eq!(command_line(&descriptor.command), "echo caf\u{fffd}");
    }

    #[test]
    fn test_fields_are_ordered_by_kind() {
        // Texts always follow command tokens, whatever order they were declared in.
        let descriptor = CommandDescriptor::default()
            .with_env("B")
            .with_text("a");
        let mut with_command = descriptor.clone();
        with_command.command = vec!["cmd".into()];

        assert_eq!(bytes_with_env(&descriptor, &[("B", "1")]), b"aB1");
        assert_eq!(bytes_with_env(&with_command, &[("B", "1")]), b"cmdaB1");
    }

    #[test]
    fn test_token_boundaries_are_not_encoded() {
        let split_one = CommandDescriptor::new(["ab", "c"]);
        let split_two = CommandDescriptor::new(["a", "bc"]);
        assert_eq!(key(&split_one), key(&split_two));
    }

    #[test]
    fn test_command_order_matters() {
        let forward = CommandDescriptor::new(["echo", "x"]);
        let reversed = CommandDescriptor::new(["x", "echo"]);
        assert_ne!(forward, reversed);
        assert_ne!(key(&forward), key(&reversed));
    }
}
