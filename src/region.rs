/// A contiguous image of bytes destined for memory, starting at address 0
pub trait Region {
  fn bytes(&self) -> &[u8];

  fn len(&self) -> usize {
    self.bytes().len()
  }

  fn is_empty(&self) -> bool {
    self.bytes().is_empty()
  }
}

/// A `Chunk` is a single program image that our virtual machine may load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
  bytes: Vec<u8>,
}

impl Chunk {
  pub(crate) fn push(&mut self, byte: u8) {
    self.bytes.push(byte);
  }
}

impl From<Vec<u8>> for Chunk {
  fn from(bytes: Vec<u8>) -> Self {
    Self { bytes }
  }
}

impl Region for Chunk {
  fn bytes(&self) -> &[u8] {
    &self.bytes
  }
}
