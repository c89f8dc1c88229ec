use std::fmt;
use std::io::{self, Write};

use tracing::{debug, info, trace};

use crate::alu::{self, AluOp};
use crate::error::Error;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::region::Region;
use crate::register::{Flags, Register, Registers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Running,
  Halted,
}

/// Why [`Vm::run`] handed control back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
  /// A `HLT` instruction was executed
  Halted,
  /// The configured cycle bound was reached, the machine is still running
  CycleLimit(u64),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
  /// Stop [`Vm::run`] after this many cycles, `None` runs until halted
  pub max_cycles: Option<u64>,
}

/// An LS-8 virtual machine.
///
/// Memory, registers, flags and the program counter all live here and nowhere
/// else. `PRN` output goes to `W`, the process stdout by default.
#[derive(Debug)]
pub struct Vm<W = io::Stdout> {
  pc: u8,
  memory: Memory,
  registers: Registers,
  flags: Flags,
  state: State,
  cycles: u64,
  config: Config,
  output: W,
}

impl Vm<io::Stdout> {
  /// Create a new, empty virtual machine printing to stdout
  pub fn new() -> Self {
    Self::with_output(io::stdout())
  }

  pub fn with_config(config: Config) -> Self {
    Self::new().config(config)
  }
}

impl Default for Vm<io::Stdout> {
  fn default() -> Self {
    Self::new()
  }
}

impl<W> Vm<W>
where
  W: Write,
{
  /// Create a new, empty virtual machine printing to `output`
  pub fn with_output(output: W) -> Self {
    Self {
      pc: 0,
      memory: Memory::new(),
      registers: Registers::new(),
      flags: Flags::default(),
      state: State::Running,
      cycles: 0,
      config: Config::default(),
      output,
    }
  }

  pub fn config(mut self, config: Config) -> Self {
    self.config = config;
    self
  }

  /// Write a program image into memory starting at address 0
  pub fn load<R>(&mut self, region: &R) -> Result<(), Error>
  where
    R: Region,
  {
    self.memory.load(region)?;
    info!(bytes = region.len(), "loaded program");
    Ok(())
  }

  /// Return to the power-on state, keeping configuration and output
  pub fn reset(&mut self) {
    self.pc = 0;
    self.memory.clear();
    self.registers = Registers::new();
    self.flags = Flags::default();
    self.state = State::Running;
    self.cycles = 0;
  }

  /// Run until the machine halts or the cycle bound is reached.
  ///
  /// Any error also leaves the machine halted. Running a machine that is
  /// already halted fails with [`Error::MachineHalted`], whether it stopped on
  /// `HLT` or on a fault.
  pub fn run(&mut self) -> Result<Exit, Error> {
    if self.state == State::Halted {
      return Err(Error::MachineHalted);
    }
    let mut budget = self.config.max_cycles;
    while self.state == State::Running {
      if let Some(remaining) = budget.as_mut() {
        if *remaining == 0 {
          debug!(cycles = self.cycles, "cycle limit reached");
          return Ok(Exit::CycleLimit(self.cycles));
        }
        *remaining -= 1;
      }
      self.step()?;
    }
    Ok(Exit::Halted)
  }

  /// Execute a single instruction
  pub fn step(&mut self) -> Result<(), Error> {
    if self.state == State::Halted {
      return Err(Error::MachineHalted);
    }
    trace!("{}", self.trace());
    let mut task = Task::new(self);
    let result = task.run();
    self.cycles += 1;
    match result {
      Ok(()) if self.state == State::Halted => {
        debug!(pc = self.pc, cycles = self.cycles, "halted");
        Ok(())
      }
      Ok(()) => Ok(()),
      Err(err) => {
        self.state = State::Halted;
        debug!(pc = self.pc, cycles = self.cycles, %err, "halted on fault");
        Err(err)
      }
    }
  }

  /// Decrement SP, then store `value` at the new top of the stack.
  ///
  /// SP wraps around both ends of memory rather than overflowing.
  pub fn push(&mut self, value: u8) -> Result<(), Error> {
    let sp = self.registers.sp().wrapping_sub(1);
    self.registers.set_sp(sp);
    self.memory.write(sp.into(), value)
  }

  /// Read the top of the stack, then increment SP.
  ///
  /// Popping an empty stack is not an error, it reads whatever is there.
  pub fn pop(&mut self) -> Result<u8, Error> {
    let sp = self.registers.sp();
    let value = self.memory.read(sp.into())?;
    self.registers.set_sp(sp.wrapping_add(1));
    Ok(value)
  }

  /// Push the value held in register `index`
  pub fn push_register(&mut self, index: u8) -> Result<(), Error> {
    let value = self.registers.get(index)?;
    self.push(value)
  }

  /// Pop into register `index`.
  ///
  /// The register is written before SP is incremented, so popping into SP
  /// itself leaves it one past the popped value.
  pub fn pop_register(&mut self, index: u8) -> Result<(), Error> {
    let sp = self.registers.sp();
    let value = self.memory.read(sp.into())?;
    self.registers.set(index, value)?;
    self.registers.set_sp(self.registers.sp().wrapping_add(1));
    Ok(())
  }

  /// Snapshot of the machine in the classic `PC FL | M[PC..PC+3] | R0..R7` form
  pub fn trace(&self) -> Trace<'_, W> {
    Trace { vm: self }
  }

  pub fn pc(&self) -> u8 {
    self.pc
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn is_halted(&self) -> bool {
    self.state == State::Halted
  }

  pub fn cycles(&self) -> u64 {
    self.cycles
  }

  pub fn flags(&self) -> Flags {
    self.flags
  }

  pub fn registers(&self) -> &Registers {
    &self.registers
  }

  pub fn registers_mut(&mut self) -> &mut Registers {
    &mut self.registers
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn memory_mut(&mut self) -> &mut Memory {
    &mut self.memory
  }

  pub fn output(&self) -> &W {
    &self.output
  }

  pub fn into_output(self) -> W {
    self.output
  }
}

/// See [`Vm::trace`]
pub struct Trace<'vm, W> {
  vm: &'vm Vm<W>,
}

impl<W> fmt::Display for Trace<'_, W> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let vm = self.vm;
    let cell = |offset: u8| vm.memory.as_slice()[usize::from(vm.pc.wrapping_add(offset))];
    write!(
      f,
      "TRACE: {:02X} {:02X} | {:02X} {:02X} {:02X} |",
      vm.pc,
      vm.flags.bits(),
      cell(0),
      cell(1),
      cell(2)
    )?;
    for value in vm.registers.as_slice() {
      write!(f, " {value:02X}")?;
    }
    Ok(())
  }
}

/// What the program counter does once an instruction has executed
enum Flow {
  /// Move past the instruction
  Next,
  /// Continue at the given address
  Jump(u8),
  /// Stop the machine
  Halt,
}

struct Task<'vm, W> {
  vm: &'vm mut Vm<W>,
  pc: u8,
}

impl<'vm, W> Task<'vm, W>
where
  W: Write,
{
  fn new(vm: &'vm mut Vm<W>) -> Self {
    let pc = vm.pc;
    Self { vm, pc }
  }

  /// The `n`th operand byte of the current instruction, starting at 0
  #[inline]
  fn operand(&self, n: u8) -> Result<u8, Error> {
    let address = self.pc.wrapping_add(1 + n);
    self.vm.memory.read(address.into())
  }

  #[inline]
  fn register(&self, n: u8) -> Result<Register, Error> {
    self.vm.registers.get(self.operand(n)?)
  }

  fn run(&mut self) -> Result<(), Error> {
    let byte = self.vm.memory.read(self.pc.into())?;
    let op = Opcode::try_from(byte).map_err(|opcode| Error::UnknownInstruction {
      opcode,
      address: self.pc,
    })?;
    let equal = self.vm.flags.equal;
    let flow = match op {
      Opcode::Ldi => load_immediate(self)?,
      Opcode::Prn => print(self)?,
      Opcode::Hlt => Flow::Halt,
      Opcode::Push => push(self)?,
      Opcode::Pop => pop(self)?,
      Opcode::Call => call(self)?,
      Opcode::Ret => ret(self)?,
      Opcode::Jmp => jump(self)?,
      Opcode::Jeq => jump_if(self, equal)?,
      Opcode::Jne => jump_if(self, !equal)?,
      Opcode::Add
      | Opcode::Mul
      | Opcode::Cmp
      | Opcode::And
      | Opcode::Or
      | Opcode::Xor
      | Opcode::Not
      | Opcode::Shl
      | Opcode::Shr
      | Opcode::Mod => arithmetic(self, AluOp::try_from(op)?)?,
    };
    match flow {
      Flow::Next => self.vm.pc = self.pc.wrapping_add(op.width()),
      Flow::Jump(target) => self.vm.pc = target,
      Flow::Halt => self.vm.state = State::Halted,
    }
    Ok(())
  }
}

// r[x] ← vv
fn load_immediate<W: Write>(task: &mut Task<'_, W>) -> Result<Flow, Error> {
  let x = task.operand(0)?;
  let vv = task.operand(1)?;
  task.vm.registers.set(x, vv)?;
  Ok(Flow::Next)
}

// print(r[x])
fn print<W: Write>(task: &mut Task<'_, W>) -> Result<Flow, Error> {
  let value = task.register(0)?;
  writeln!(task.vm.output, "{value}")?;
  Ok(Flow::Next)
}

// sp ← sp − 1; m[sp] ← r[x]
fn push<W: Write>(task: &mut Task<'_, W>) -> Result<Flow, Error> {
  let x = task.operand(0)?;
  task.vm.push_register(x)?;
  Ok(Flow::Next)
}

// r[x] ← m[sp]; sp ← sp + 1
fn pop<W: Write>(task: &mut Task<'_, W>) -> Result<Flow, Error> {
  let x = task.operand(0)?;
  task.vm.pop_register(x)?;
  Ok(Flow::Next)
}

// push(pc + 2); pc ← r[x]
fn call<W: Write>(task: &mut Task<'_, W>) -> Result<Flow, Error> {
  let x = task.operand(0)?;
  task.vm.push(task.pc.wrapping_add(2))?;
  // read after pushing, CALL through SP sees the decremented value
  let target = task.vm.registers.get(x)?;
  Ok(Flow::Jump(target))
}

// pc ← pop()
fn ret<W: Write>(task: &mut Task<'_, W>) -> Result<Flow, Error> {
  let target = task.vm.pop()?;
  Ok(Flow::Jump(target))
}

// pc ← r[x]
fn jump<W: Write>(task: &mut Task<'_, W>) -> Result<Flow, Error> {
  Ok(Flow::Jump(task.register(0)?))
}

// if cond: pc ← r[x]
fn jump_if<W: Write>(task: &mut Task<'_, W>, cond: bool) -> Result<Flow, Error> {
  if cond {
    jump(task)
  } else {
    Ok(Flow::Next)
  }
}

// r[a] ← r[a] op r[b]
fn arithmetic<W: Write>(task: &mut Task<'_, W>, op: AluOp) -> Result<Flow, Error> {
  let a = task.operand(0)?;
  let b = task.operand(1)?;
  let vm = &mut *task.vm;
  alu::execute(op, a, b, &mut vm.registers, &mut vm.flags)?;
  Ok(Flow::Next)
}
