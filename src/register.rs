use std::cmp::Ordering;

use crate::error::Error;

/// The type of a single register in our virtual machine
pub type Register = u8;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;

/// Index of the register reserved as the stack pointer
pub const SP: u8 = 7;

/// Where the stack pointer starts, just below the top of memory
pub const STACK_START: Register = 0xF4;

/// General purpose registers `R0` through `R7`.
///
/// `R7` doubles as the stack pointer but is otherwise an ordinary register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
  values: [Register; REGISTER_COUNT],
}

impl Registers {
  pub fn new() -> Self {
    let mut values = [0; REGISTER_COUNT];
    values[SP as usize] = STACK_START;
    Self { values }
  }

  pub fn get(&self, index: u8) -> Result<Register, Error> {
    self
      .values
      .get(index as usize)
      .copied()
      .ok_or(Error::RegisterOutOfRange(index))
  }

  pub fn set(&mut self, index: u8, value: Register) -> Result<(), Error> {
    let slot = self
      .values
      .get_mut(index as usize)
      .ok_or(Error::RegisterOutOfRange(index))?;
    *slot = value;
    Ok(())
  }

  pub fn sp(&self) -> Register {
    self.values[SP as usize]
  }

  pub(crate) fn set_sp(&mut self, value: Register) {
    self.values[SP as usize] = value;
  }

  pub fn as_slice(&self) -> &[Register] {
    &self.values
  }
}

impl Default for Registers {
  fn default() -> Self {
    Self::new()
  }
}

/// Condition flags, written only by `CMP`.
///
/// Before the first comparison every flag is clear, afterwards exactly one is
/// set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
  pub equal: bool,
  pub greater: bool,
  pub less: bool,
}

impl Flags {
  pub fn from_ordering(ordering: Ordering) -> Self {
    Self {
      equal: ordering == Ordering::Equal,
      greater: ordering == Ordering::Greater,
      less: ordering == Ordering::Less,
    }
  }

  /// The conventional `00000LGE` flag byte
  pub fn bits(&self) -> u8 {
    (self.less as u8) << 2 | (self.greater as u8) << 1 | self.equal as u8
  }
}
