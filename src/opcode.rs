//! Instruction encodings.
//!
//! Every opcode is a single byte laid out as `AABCDDDD`, where `AA` is the
//! number of operand bytes that follow it.

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// Loads an immediate value into a register.
  ///
  /// | Operation      | Semantics/RTL | Assembly     |
  /// |----------------|---------------|--------------|
  /// | Load Immediate | `r[x] ← vv`   | `LDI rx, vv` |
  Ldi = 0b1000_0010,

  /// Prints the decimal value held in a register.
  ///
  /// | Operation | Semantics/RTL   | Assembly |
  /// |-----------|-----------------|----------|
  /// | Print     | `print(r[x])`   | `PRN rx` |
  Prn = 0b0100_0111,

  /// | Operation | Semantics/RTL      | Assembly |
  /// |-----------|--------------------|----------|
  /// | Halt      | `(stop execution)` | `HLT`    |
  Hlt = 0b0000_0001,

  /// | Operation | Semantics/RTL        | Assembly     |
  /// |-----------|----------------------|--------------|
  /// | Multiply  | `r[a] ← r[a] × r[b]` | `MUL ra, rb` |
  Mul = 0b1010_0010,

  /// | Operation | Semantics/RTL        | Assembly     |
  /// |-----------|----------------------|--------------|
  /// | Add       | `r[a] ← r[a] + r[b]` | `ADD ra, rb` |
  Add = 0b1010_0000,

  /// | Operation | Semantics/RTL                     | Assembly  |
  /// |-----------|-----------------------------------|-----------|
  /// | Push      | `sp ← sp − 1`, `m[sp] ← r[x]`     | `PUSH rx` |
  Push = 0b0100_0101,

  /// | Operation | Semantics/RTL                     | Assembly |
  /// |-----------|-----------------------------------|----------|
  /// | Pop       | `r[x] ← m[sp]`, `sp ← sp + 1`     | `POP rx` |
  Pop = 0b0100_0110,

  /// Calls the subroutine whose address is held in a register.
  ///
  /// | Operation | Semantics/RTL                            | Assembly  |
  /// |-----------|------------------------------------------|-----------|
  /// | Call      | `push(pc + 2)`, `pc ← r[x]`              | `CALL rx` |
  Call = 0b0101_0000,

  /// | Operation | Semantics/RTL | Assembly |
  /// |-----------|---------------|----------|
  /// | Return    | `pc ← pop()`  | `RET`    |
  Ret = 0b0001_0001,

  /// Compares two registers, overwriting every flag.
  ///
  /// | Operation | Semantics/RTL                          | Assembly     |
  /// |-----------|----------------------------------------|--------------|
  /// | Compare   | `E ← a = b`, `G ← a > b`, `L ← a < b`  | `CMP ra, rb` |
  Cmp = 0b1010_0111,

  /// | Operation | Semantics/RTL | Assembly |
  /// |-----------|---------------|----------|
  /// | Jump      | `pc ← r[x]`   | `JMP rx` |
  Jmp = 0b0101_0100,

  /// | Operation     | Semantics/RTL     | Assembly |
  /// |---------------|-------------------|----------|
  /// | Jump If Equal | `if E: pc ← r[x]` | `JEQ rx` |
  Jeq = 0b0101_0101,

  /// | Operation         | Semantics/RTL      | Assembly |
  /// |-------------------|--------------------|----------|
  /// | Jump If Not Equal | `if !E: pc ← r[x]` | `JNE rx` |
  Jne = 0b0101_0110,

  /// | Operation   | Semantics/RTL        | Assembly     |
  /// |-------------|----------------------|--------------|
  /// | Logical AND | `r[a] ← r[a] & r[b]` | `AND ra, rb` |
  And = 0b1010_1000,

  /// | Operation  | Semantics/RTL        | Assembly    |
  /// |------------|----------------------|-------------|
  /// | Logical OR | `r[a] ← r[a] \| r[b]` | `OR ra, rb` |
  Or = 0b1010_1010,

  /// | Operation   | Semantics/RTL        | Assembly     |
  /// |-------------|----------------------|--------------|
  /// | Logical XOR | `r[a] ← r[a] ^ r[b]` | `XOR ra, rb` |
  Xor = 0b1010_1011,

  /// Complements a register in place.
  ///
  /// NOTE: the encoding says one operand, but we decode it three bytes wide
  /// like the rest of the ALU group and ignore the second operand byte.
  ///
  /// | Operation   | Semantics/RTL   | Assembly |
  /// |-------------|-----------------|----------|
  /// | Logical NOT | `r[x] ← ~r[x]`  | `NOT rx` |
  Not = 0b0110_1001,

  /// | Operation          | Semantics/RTL         | Assembly     |
  /// |--------------------|-----------------------|--------------|
  /// | Shift Left Logical | `r[a] ← r[a] << r[b]` | `SHL ra, rb` |
  Shl = 0b1010_1100,

  /// | Operation           | Semantics/RTL         | Assembly     |
  /// |---------------------|-----------------------|--------------|
  /// | Shift Right Logical | `r[a] ← r[a] >> r[b]` | `SHR ra, rb` |
  Shr = 0b1010_1101,

  /// Halts with an arithmetic error when `r[b]` is zero.
  ///
  /// | Operation | Semantics/RTL        | Assembly     |
  /// |-----------|----------------------|--------------|
  /// | Modulo    | `r[a] ← r[a] % r[b]` | `MOD ra, rb` |
  Mod = 0b1010_0100,
}

impl Opcode {
  /// Number of operand bytes following the opcode
  pub fn operand_count(self) -> u8 {
    match self {
      Self::Not => 2,
      op => op as u8 >> 6,
    }
  }

  /// Total encoded size of the instruction, opcode included
  pub fn width(self) -> u8 {
    1 + self.operand_count()
  }

  pub fn mnemonic(self) -> &'static str {
    match self {
      Self::Ldi => "LDI",
      Self::Prn => "PRN",
      Self::Hlt => "HLT",
      Self::Mul => "MUL",
      Self::Add => "ADD",
      Self::Push => "PUSH",
      Self::Pop => "POP",
      Self::Call => "CALL",
      Self::Ret => "RET",
      Self::Cmp => "CMP",
      Self::Jmp => "JMP",
      Self::Jeq => "JEQ",
      Self::Jne => "JNE",
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

impl TryFrom<u8> for Opcode {
  /// The byte that failed to decode
  type Error = u8;

  fn try_from(byte: u8) -> Result<Self, Self::Error> {
    match byte {
      0b1000_0010 => Ok(Self::Ldi),
      0b0100_0111 => Ok(Self::Prn),
      0b0000_0001 => Ok(Self::Hlt),
      0b1010_0010 => Ok(Self::Mul),
      0b1010_0000 => Ok(Self::Add),
      0b0100_0101 => Ok(Self::Push),
      0b0100_0110 => Ok(Self::Pop),
      0b0101_0000 => Ok(Self::Call),
      0b0001_0001 => Ok(Self::Ret),
      0b1010_0111 => Ok(Self::Cmp),
      0b0101_0100 => Ok(Self::Jmp),
      0b0101_0101 => Ok(Self::Jeq),
      0b0101_0110 => Ok(Self::Jne),
      0b1010_1000 => Ok(Self::And),
      0b1010_1010 => Ok(Self::Or),
      0b1010_1011 => Ok(Self::Xor),
      0b0110_1001 => Ok(Self::Not),
      0b1010_1100 => Ok(Self::Shl),
      0b1010_1101 => Ok(Self::Shr),
      0b1010_0100 => Ok(Self::Mod),
      other => Err(other),
    }
  }
}

impl std::fmt::Display for Opcode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.mnemonic())
  }
}
