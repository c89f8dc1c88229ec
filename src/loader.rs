//! Object file loading.
//!
//! An object file (`*.ls8`) holds one binary literal per line. Anything from a
//! `#` to the end of the line is a comment, and blank lines are skipped:
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::memory::MEMORY_SIZE;
use crate::region::{Chunk, Region};

/// Extension every object file must carry
pub const EXTENSION: &str = "ls8";

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
  #[error("no file name provided")]
  NoFileName,

  #[error("`{}` is not an object file, only `.ls8` files are accepted", .0.display())]
  WrongExtension(PathBuf),

  #[error("could not read `{}`: {source}", path.display())]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("line {line}: `{token}` is not a binary literal")]
  Parse { line: usize, token: String },

  #[error("program of {0} bytes does not fit in memory")]
  TooLarge(usize),
}

/// Load the object file named by the first of `args`, as a command line would
/// hand them over.
pub fn load_args<I, P>(args: I) -> Result<Chunk, LoadError>
where
  I: IntoIterator<Item = P>,
  P: AsRef<Path>,
{
  let path = args.into_iter().next().ok_or(LoadError::NoFileName)?;
  load_file(path.as_ref())
}

/// Read and parse an object file from disk
pub fn load_file(path: &Path) -> Result<Chunk, LoadError> {
  if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
    return Err(LoadError::WrongExtension(path.to_owned()));
  }
  let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
    path: path.to_owned(),
    source,
  })?;
  debug!(path = %path.display(), "read object file");
  parse(&source)
}

/// Parse the text of an object file into a program image.
///
/// Literals wider than a byte are truncated to their low 8 bits, the same as
/// any other write to memory.
pub fn parse(source: &str) -> Result<Chunk, LoadError> {
  let mut chunk = Chunk::default();
  for (number, line) in source.lines().enumerate() {
    let token = match line.split_once('#') {
      Some((code, _comment)) => code,
      None => line,
    }
    .trim();
    if token.is_empty() {
      continue;
    }
    let value = token
      .bytes()
      .try_fold(0u8, |acc, digit| match digit {
        b'0' => Some(acc << 1),
        b'1' => Some(acc << 1 | 1),
        _ => None,
      })
      .ok_or_else(|| LoadError::Parse {
        line: number + 1,
        token: token.to_owned(),
      })?;
    chunk.push(value);
  }
  let len = chunk.len();
  if len > MEMORY_SIZE {
    return Err(LoadError::TooLarge(len));
  }
  Ok(chunk)
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::io::Write;

  #[test]
  fn parse_program() {
    let source = "\
# print8.ls8
10000010 # LDI R0,8
00000000
00001000

01000111 # PRN R0
00000000
00000001 # HLT
";
    let chunk = parse(source).unwrap();
    assert_eq!(
      chunk.bytes(),
      &[0b10000010, 0, 8, 0b01000111, 0, 0b00000001]
    );
  }

  #[test]
  fn parse_comment_only_and_blank() {
    let chunk = parse("# nothing here\n\n   \n\t# still nothing\n").unwrap();
    assert!(chunk.is_empty());
  }

  #[test]
  fn parse_surrounding_whitespace() {
    let chunk = parse("   101   \r\n\t11#x\n").unwrap();
    assert_eq!(chunk.bytes(), &[5, 3]);
  }

  #[test]
  fn parse_truncates_wide_literals() {
    let chunk = parse("100000001\n").unwrap();
    assert_eq!(chunk.bytes(), &[1]);
  }

  #[test]
  fn parse_rejects_non_binary() {
    let err = parse("00000001\n00000002\n").unwrap_err();
    assert!(matches!(
      err,
      LoadError::Parse { line: 2, ref token } if token == "00000002"
    ));
    assert!(matches!(parse("LDI\n"), Err(LoadError::Parse { line: 1, .. })));
    assert!(matches!(parse("+101\n"), Err(LoadError::Parse { line: 1, .. })));
  }

  #[test]
  fn parse_too_large() {
    let source = "1\n".repeat(257);
    assert!(matches!(parse(&source), Err(LoadError::TooLarge(257))));
  }

  #[test]
  fn no_file_name() {
    let args: Vec<PathBuf> = Vec::new();
    assert!(matches!(load_args(args), Err(LoadError::NoFileName)));
  }

  #[test]
  fn wrong_extension() {
    assert!(matches!(
      load_file(Path::new("program.txt")),
      Err(LoadError::WrongExtension(_))
    ));
    assert!(matches!(
      load_file(Path::new("program")),
      Err(LoadError::WrongExtension(_))
    ));
  }

  #[test]
  fn missing_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("missing.ls8");
    assert!(matches!(load_file(&path), Err(LoadError::Io { .. })));
  }

  #[test]
  fn load_from_disk() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("halt.ls8");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "# just halt").unwrap();
    writeln!(file, "00000001").unwrap();
    drop(file);
    let chunk = load_args([&path]).unwrap();
    assert_eq!(chunk.bytes(), &[1]);
  }
}
