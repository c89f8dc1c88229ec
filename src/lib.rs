//! Bare-bones implementation of the LS-8, an 8-bit toy computer with 256 bytes
//! of memory, eight registers and a downward growing stack.
//!
//! Programs are plain-text object files of binary literals, see [`loader`].

pub mod alu;
pub mod error;
pub mod loader;
pub mod memory;
pub mod opcode;
pub mod region;
pub mod register;
pub mod vm;
