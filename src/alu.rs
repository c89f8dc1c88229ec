//! Arithmetic logic unit.
//!
//! The ALU only ever touches registers and flags. Memory and the program
//! counter are out of its reach.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::opcode::Opcode;
use crate::register::{Flags, Registers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
  Add,
  Mul,
  Cmp,
  And,
  Or,
  Xor,
  Not,
  Shl,
  Shr,
  Mod,
}

impl AluOp {
  pub fn name(self) -> &'static str {
    match self {
      Self::Add => "ADD",
      Self::Mul => "MUL",
      Self::Cmp => "CMP",
      Self::And => "AND",
      Self::Or => "OR",
      Self::Xor => "XOR",
      Self::Not => "NOT",
      Self::Shl => "SHL",
      Self::Shr => "SHR",
      Self::Mod => "MOD",
    }
  }
}

impl fmt::Display for AluOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for AluOp {
  type Err = Error;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    match name {
      "ADD" => Ok(Self::Add),
      "MUL" => Ok(Self::Mul),
      "CMP" => Ok(Self::Cmp),
      "AND" => Ok(Self::And),
      "OR" => Ok(Self::Or),
      "XOR" => Ok(Self::Xor),
      "NOT" => Ok(Self::Not),
      "SHL" => Ok(Self::Shl),
      "SHR" => Ok(Self::Shr),
      "MOD" => Ok(Self::Mod),
      other => Err(Error::UnsupportedOperation(other.to_owned())),
    }
  }
}

impl TryFrom<Opcode> for AluOp {
  type Error = Error;

  fn try_from(op: Opcode) -> Result<Self, Self::Error> {
    match op {
      Opcode::Add => Ok(Self::Add),
      Opcode::Mul => Ok(Self::Mul),
      Opcode::Cmp => Ok(Self::Cmp),
      Opcode::And => Ok(Self::And),
      Opcode::Or => Ok(Self::Or),
      Opcode::Xor => Ok(Self::Xor),
      Opcode::Not => Ok(Self::Not),
      Opcode::Shl => Ok(Self::Shl),
      Opcode::Shr => Ok(Self::Shr),
      Opcode::Mod => Ok(Self::Mod),
      other => Err(Error::UnsupportedOperation(other.mnemonic().to_owned())),
    }
  }
}

/// Apply `op` to registers `a` and `b`, storing the result in `a`.
///
/// `CMP` stores nothing and overwrites the flags instead, `NOT` ignores `b`.
/// On error no register or flag has been modified.
pub fn execute(
  op: AluOp,
  a: u8,
  b: u8,
  registers: &mut Registers,
  flags: &mut Flags,
) -> Result<(), Error> {
  let ra = registers.get(a)?;
  let rb = || registers.get(b);
  let result = match op {
    AluOp::Add => ra.wrapping_add(rb()?),
    AluOp::Mul => ra.wrapping_mul(rb()?),
    AluOp::Cmp => {
      *flags = Flags::from_ordering(ra.cmp(&rb()?));
      return Ok(());
    }
    AluOp::And => ra & rb()?,
    AluOp::Or => ra | rb()?,
    AluOp::Xor => ra ^ rb()?,
    AluOp::Not => !ra,
    // shifting every bit out leaves nothing behind
    AluOp::Shl => ra.checked_shl(rb()?.into()).unwrap_or(0),
    AluOp::Shr => ra.checked_shr(rb()?.into()).unwrap_or(0),
    AluOp::Mod => ra
      .checked_rem(rb()?)
      .ok_or(Error::DivisionByZero { op })?,
  };
  registers.set(a, result)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn alu(op: AluOp, ra: u8, rb: u8) -> (Result<(), Error>, Registers, Flags) {
    let mut registers = Registers::new();
    let mut flags = Flags::default();
    registers.set(0, ra).unwrap();
    registers.set(1, rb).unwrap();
    let result = execute(op, 0, 1, &mut registers, &mut flags);
    (result, registers, flags)
  }

  fn value(op: AluOp, ra: u8, rb: u8) -> u8 {
    let (result, registers, _) = alu(op, ra, rb);
    result.unwrap();
    assert_eq!(registers.get(1).unwrap(), rb); // r[b] untouched
    registers.get(0).unwrap()
  }

  #[test]
  fn add() {
    assert_eq!(value(AluOp::Add, 10, 20), 30);
    assert_eq!(value(AluOp::Add, 250, 10), 4);
  }

  #[test]
  fn mul() {
    assert_eq!(value(AluOp::Mul, 8, 9), 72);
    assert_eq!(value(AluOp::Mul, 16, 16), 0);
  }

  #[test]
  fn bitwise() {
    assert_eq!(value(AluOp::And, 0b1010, 0b0110), 0b0010);
    assert_eq!(value(AluOp::Or, 0b1010, 0b0110), 0b1110);
    assert_eq!(value(AluOp::Xor, 0b1010, 0b0110), 0b1100);
  }

  #[test]
  fn not_uses_value_of_register() {
    // r0 holds 1, which is also a register index; the result must be ~r0,
    // not ~r[r0]
    let (result, registers, _) = alu(AluOp::Not, 0b0000_0001, 0b1111_0000);
    result.unwrap();
    assert_eq!(registers.get(0).unwrap(), 0b1111_1110);
    assert_eq!(registers.get(1).unwrap(), 0b1111_0000);
  }

  #[test]
  fn not_ignores_second_operand() {
    let mut registers = Registers::new();
    let mut flags = Flags::default();
    registers.set(2, 0x0F).unwrap();
    execute(AluOp::Not, 2, 200, &mut registers, &mut flags).unwrap();
    assert_eq!(registers.get(2).unwrap(), 0xF0);
  }

  #[test]
  fn shifts_write_back() {
    assert_eq!(value(AluOp::Shl, 0b0001, 2), 0b0100);
    assert_eq!(value(AluOp::Shr, 0b1000, 3), 0b0001);
    assert_eq!(value(AluOp::Shl, 0b1100_0000, 1), 0b1000_0000);
    assert_eq!(value(AluOp::Shl, 0xFF, 8), 0);
    assert_eq!(value(AluOp::Shr, 0xFF, 200), 0);
  }

  #[test]
  fn modulo() {
    assert_eq!(value(AluOp::Mod, 17, 5), 2);
  }

  #[test]
  fn modulo_by_zero() {
    let (result, registers, _) = alu(AluOp::Mod, 17, 0);
    assert!(matches!(
      result,
      Err(Error::DivisionByZero { op: AluOp::Mod })
    ));
    assert_eq!(registers.get(0).unwrap(), 17);
  }

  #[test]
  fn cmp_sets_exactly_one_flag() {
    let (_, registers, flags) = alu(AluOp::Cmp, 5, 5);
    assert_eq!(flags, Flags::from_ordering(std::cmp::Ordering::Equal));
    assert_eq!(registers.get(0).unwrap(), 5);

    let (_, _, flags) = alu(AluOp::Cmp, 6, 5);
    assert!(!flags.equal && flags.greater && !flags.less);

    let (_, _, flags) = alu(AluOp::Cmp, 4, 5);
    assert!(!flags.equal && !flags.greater && flags.less);
  }

  #[test]
  fn cmp_overwrites_previous_flags() {
    let mut registers = Registers::new();
    let mut flags = Flags {
      equal: true,
      greater: true,
      less: true,
    };
    registers.set(0, 1).unwrap();
    execute(AluOp::Cmp, 0, 1, &mut registers, &mut flags).unwrap();
    assert_eq!(flags.bits(), 0b010);
  }

  #[test]
  fn bad_register() {
    let mut registers = Registers::new();
    let mut flags = Flags::default();
    assert!(matches!(
      execute(AluOp::Add, 0, 9, &mut registers, &mut flags),
      Err(Error::RegisterOutOfRange(9))
    ));
  }

  #[test]
  fn parse_names() {
    assert_eq!("SHL".parse::<AluOp>().unwrap(), AluOp::Shl);
    assert!(matches!(
      "SUB".parse::<AluOp>(),
      Err(Error::UnsupportedOperation(name)) if name == "SUB"
    ));
  }

  #[test]
  fn from_opcode() {
    assert_eq!(AluOp::try_from(Opcode::Mod).unwrap(), AluOp::Mod);
    assert!(matches!(
      AluOp::try_from(Opcode::Ldi),
      Err(Error::UnsupportedOperation(name)) if name == "LDI"
    ));
  }
}
