use crate::error::Error;
use crate::region::Region;

/// Number of addressable cells
pub const MEMORY_SIZE: usize = 256;

/// Byte addressable memory, zero filled on creation.
#[derive(Debug, Clone)]
pub struct Memory {
  cells: [u8; MEMORY_SIZE],
}

impl Memory {
  pub fn new() -> Self {
    Self {
      cells: [0; MEMORY_SIZE],
    }
  }

  pub fn read(&self, address: usize) -> Result<u8, Error> {
    self
      .cells
      .get(address)
      .copied()
      .ok_or(Error::AddressOutOfRange(address))
  }

  pub fn write(&mut self, address: usize, value: u8) -> Result<(), Error> {
    self
      .cells
      .get_mut(address)
      .map(|cell| {
        *cell = value;
      })
      .ok_or(Error::AddressOutOfRange(address))
  }

  /// Zero every cell
  pub fn clear(&mut self) {
    self.cells = [0; MEMORY_SIZE];
  }

  /// Copy a whole region into memory starting at address 0, leaving the rest
  /// untouched.
  pub fn load<R>(&mut self, region: &R) -> Result<(), Error>
  where
    R: Region,
  {
    let bytes = region.bytes();
    if bytes.len() > MEMORY_SIZE {
      return Err(Error::ProgramTooLarge(bytes.len()));
    }
    self.cells[..bytes.len()].copy_from_slice(bytes);
    Ok(())
  }

  pub fn as_slice(&self) -> &[u8] {
    &self.cells
  }
}

impl Default for Memory {
  fn default() -> Self {
    Self::new()
  }
}
