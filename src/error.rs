use crate::alu::AluOp;

/// An error that occurred during execution of instructions.
///
/// Whatever the variant, the machine that raised it is halted afterwards.
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("unknown instruction `{opcode:#010b}` at address {address}")]
  UnknownInstruction { opcode: u8, address: u8 },

  #[error("arithmetic error: division by zero in `{op}`")]
  DivisionByZero { op: AluOp },

  #[error("address {0} is outside of memory")]
  AddressOutOfRange(usize),

  #[error("register {0} does not exist")]
  RegisterOutOfRange(u8),

  #[error("unsupported ALU operation `{0}`")]
  UnsupportedOperation(String),

  #[error("program of {0} bytes does not fit in memory")]
  ProgramTooLarge(usize),

  #[error("machine is halted")]
  MachineHalted,

  #[error("failed to write output: {0}")]
  Output(#[from] std::io::Error),
}
