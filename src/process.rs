use super::error::{Error, Result};
use super::program::Program;
use std::collections::VecDeque;
use std::convert::TryFrom;
use tracing::{debug, trace};

/// What a single call to [`Process::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Output(i64),
    Blocked,
    Halted,
}

/// Why [`Process::resume`] handed control back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Output(i64),
    Blocked,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Position,
    Immediate,
}

struct Modes(i64);

impl Modes {
    fn mode(&self, index: usize, address: usize) -> Result<Mode> {
        let mode = (self.0 / 10_i64.pow(index as u32)) % 10;
        match mode {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            _ => Err(Error::UnknownMode { mode, address }),
        }
    }
}

fn to_address(value: i64, memory: &[i64]) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|&address| address < memory.len())
        .ok_or(Error::OutOfBounds {
            address: value,
            size: memory.len(),
        })
}

fn load(memory: &[i64], address: usize) -> Result<i64> {
    memory.get(address).copied().ok_or(Error::OutOfBounds {
        address: address as i64,
        size: memory.len(),
    })
}

#[derive(Debug)]
struct Parameter {
    mode: Mode,
    value: i64,
}

impl Parameter {
    fn resolve(&self, memory: &[i64]) -> Result<i64> {
        use Mode::*;
        match self.mode {
            Position => load(memory, to_address(self.value, memory)?),
            Immediate => Ok(self.value),
        }
    }
}

struct Parameters<'a> {
    memory: &'a [i64],
    address: usize,
    modes: Modes,
}

impl<'a> Parameters<'a> {
    fn new(memory: &'a [i64], address: usize, modes: i64) -> Self {
        Parameters {
            memory,
            address,
            modes: Modes(modes),
        }
    }

    fn get(&self, index: usize) -> Result<Parameter> {
        Ok(Parameter {
            mode: self.modes.mode(index, self.address)?,
            value: load(self.memory, self.address + 1 + index)?,
        })
    }

    /// Write targets are always raw positions.
    fn get_address(&self, index: usize) -> Result<usize> {
        match self.get(index)? {
            Parameter {
                mode: Mode::Position,
                value,
            } => to_address(value, self.memory),
            Parameter {
                mode: Mode::Immediate,
                ..
            } => Err(Error::ImmediateWrite {
                address: self.address,
            }),
        }
    }
}

#[derive(Debug)]
enum Instruction {
    Add {
        x: Parameter,
        y: Parameter,
        output: usize,
    },
    Mul {
        x: Parameter,
        y: Parameter,
        output: usize,
    },
    Input {
        output: usize,
    },
    Output {
        input: Parameter,
    },
    JumpIfTrue {
        input: Parameter,
        target: Parameter,
    },
    JumpIfFalse {
        input: Parameter,
        target: Parameter,
    },
    LessThan {
        x: Parameter,
        y: Parameter,
        output: usize,
    },
    Equals {
        x: Parameter,
        y: Parameter,
        output: usize,
    },
    Exit,
}

impl Instruction {
    fn parse(memory: &[i64], address: usize) -> Result<Self> {
        use Instruction::*;
        let word = load(memory, address)?;
        let opcode = word % 100;
        let parameters = Parameters::new(memory, address, word / 100);
        match opcode {
            1 => Ok(Add {
                x: parameters.get(0)?,
                y: parameters.get(1)?,
                output: parameters.get_address(2)?,
            }),
            2 => Ok(Mul {
                x: parameters.get(0)?,
                y: parameters.get(1)?,
                output: parameters.get_address(2)?,
            }),
            3 => Ok(Input {
                output: parameters.get_address(0)?,
            }),
            4 => Ok(Output {
                input: parameters.get(0)?,
            }),
            5 => Ok(JumpIfTrue {
                input: parameters.get(0)?,
                target: parameters.get(1)?,
            }),
            6 => Ok(JumpIfFalse {
                input: parameters.get(0)?,
                target: parameters.get(1)?,
            }),
            7 => Ok(LessThan {
                x: parameters.get(0)?,
                y: parameters.get(1)?,
                output: parameters.get_address(2)?,
            }),
            8 => Ok(Equals {
                x: parameters.get(0)?,
                y: parameters.get(1)?,
                output: parameters.get_address(2)?,
            }),
            99 => Ok(Exit),
            _ => Err(Error::UnknownOpcode { opcode, address }),
        }
    }

    fn size(&self) -> usize {
        use Instruction::*;
        match self {
            Add { .. } | Mul { .. } | LessThan { .. } | Equals { .. } => 4,
            JumpIfTrue { .. } | JumpIfFalse { .. } => 3,
            Input { .. } | Output { .. } => 2,
            Exit => 1,
        }
    }
}

/// A FIFO queue owned by a single process.
#[derive(Debug)]
struct Channel<T> {
    buffer: VecDeque<T>,
}

impl<T> Channel<T> {
    fn new() -> Self {
        Channel {
            buffer: VecDeque::new(),
        }
    }

    fn put(&mut self, value: T) {
        self.buffer.push_back(value)
    }

    fn get(&mut self) -> Option<T> {
        self.buffer.pop_front()
    }

    fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.buffer.drain(..)
    }
}

impl<T> Extend<T> for Channel<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.buffer.extend(iter)
    }
}

/// A resumable processor with its own copy of memory and its own queues.
///
/// Nothing is shared between processes, so several of them can be
/// interleaved by a scheduler simply by calling [`Process::resume`] in turn.
#[derive(Debug)]
pub struct Process {
    name: String,
    memory: Box<[i64]>,
    instruction_pointer: usize,
    input: Channel<i64>,
    output: Channel<i64>,
    halted: bool,
}

impl Process {
    pub fn new<T: ToString>(name: T, program: &Program) -> Self {
        Process {
            name: name.to_string(),
            memory: program.data.clone(),
            instruction_pointer: 0,
            input: Channel::new(),
            output: Channel::new(),
            halted: false,
        }
    }

    pub fn with_inputs<T: ToString>(
        name: T,
        program: &Program,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Self {
        let mut process = Process::new(name, program);
        process.input.extend(inputs);
        process
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn memory(&self) -> &[i64] {
        &self.memory
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn push_input(&mut self, value: i64) {
        self.input.put(value)
    }

    pub fn take_output(&mut self) -> Option<i64> {
        self.output.get()
    }

    pub fn drain_output(&mut self) -> Vec<i64> {
        self.output.drain().collect()
    }

    pub fn set(&mut self, address: usize, value: i64) -> Result<()> {
        let size = self.memory.len();
        let cell = self.memory.get_mut(address).ok_or(Error::OutOfBounds {
            address: address as i64,
            size,
        })?;
        *cell = value;
        Ok(())
    }

    /// Decodes and executes the instruction at the instruction pointer.
    ///
    /// On [`Step::Blocked`] the pointer stays on the input instruction, so
    /// the same instruction runs again once input has been pushed.
    pub fn step(&mut self) -> Result<Step> {
        if self.halted {
            return Err(Error::Halted(self.name.clone()));
        }

        let address = self.instruction_pointer;
        let instruction = Instruction::parse(&self.memory, address)?;
        trace!(process = %self.name, address, ?instruction, "execute");

        let mut next = address + instruction.size();
        let step = match instruction {
            Instruction::Add { x, y, output } => {
                let value = x
                    .resolve(&self.memory)?
                    .checked_add(y.resolve(&self.memory)?)
                    .ok_or(Error::Overflow { address })?;
                self.memory[output] = value;
                Step::Continue
            }
            Instruction::Mul { x, y, output } => {
                let value = x
                    .resolve(&self.memory)?
                    .checked_mul(y.resolve(&self.memory)?)
                    .ok_or(Error::Overflow { address })?;
                self.memory[output] = value;
                Step::Continue
            }
            Instruction::Input { output } => {
                if let Some(input) = self.input.get() {
                    self.memory[output] = input;
                    Step::Continue
                } else {
                    next = address;
                    Step::Blocked
                }
            }
            Instruction::Output { input } => {
                let value = input.resolve(&self.memory)?;
                self.output.put(value);
                Step::Output(value)
            }
            Instruction::JumpIfTrue { input, target } => {
                if input.resolve(&self.memory)? != 0 {
                    next = to_address(target.resolve(&self.memory)?, &self.memory)?;
                }
                Step::Continue
            }
            Instruction::JumpIfFalse { input, target } => {
                if input.resolve(&self.memory)? == 0 {
                    next = to_address(target.resolve(&self.memory)?, &self.memory)?;
                }
                Step::Continue
            }
            Instruction::LessThan { x, y, output } => {
                let value = if x.resolve(&self.memory)? < y.resolve(&self.memory)? {
                    1
                } else {
                    0
                };
                self.memory[output] = value;
                Step::Continue
            }
            Instruction::Equals { x, y, output } => {
                let value = if x.resolve(&self.memory)? == y.resolve(&self.memory)? {
                    1
                } else {
                    0
                };
                self.memory[output] = value;
                Step::Continue
            }
            Instruction::Exit => {
                debug!(process = %self.name, address, "halted");
                self.halted = true;
                Step::Halted
            }
        };

        self.instruction_pointer = next;
        Ok(step)
    }

    /// Runs until the next suspension point.
    pub fn resume(&mut self) -> Result<State> {
        loop {
            match self.step()? {
                Step::Continue => {}
                Step::Output(value) => return Ok(State::Output(value)),
                Step::Blocked => return Ok(State::Blocked),
                Step::Halted => return Ok(State::Halted),
            }
        }
    }

    /// Runs to completion and returns everything written to the output queue.
    ///
    /// Nothing can feed a process run this way, so blocking on input fails
    /// with [`Error::InputExhausted`].
    pub fn run(&mut self) -> Result<Vec<i64>> {
        loop {
            match self.resume()? {
                State::Output(_) => {}
                State::Blocked => return Err(Error::InputExhausted(self.name.clone())),
                State::Halted => return Ok(self.drain_output()),
            }
        }
    }
}
