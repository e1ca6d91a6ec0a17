use super::error::{Error, Result};
use super::process::{Process, State};
use super::program::Program;
use std::iter::once;
use tracing::debug;

struct Amplifier {
    process: Process,
    retired: bool,
    last_signal: Option<i64>,
}

/// What happened during one [`Network::turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The amplifier at this index reached a suspension point.
    Suspended { amplifier: usize, state: State },
    /// The last amplifier halted; this is its final signal.
    Finished(i64),
}

/// A ring of amplifiers, each feeding its output into the next one's input.
///
/// The output of the last amplifier loops back into the first. The run ends
/// when the last amplifier halts, and its final output is the network's
/// signal.
pub struct Network {
    amplifiers: Vec<Amplifier>,
    initial_signal: Option<i64>,
    current: usize,
    idle: usize,
}

impl Network {
    pub fn new(program: &Program, phase_settings: &[i64]) -> Self {
        let amplifiers = phase_settings
            .iter()
            .enumerate()
            .map(|(index, &setting)| Amplifier {
                process: Process::with_inputs(
                    format!("Amplifier {}", index),
                    program,
                    once(setting),
                ),
                retired: false,
                last_signal: None,
            })
            .collect();

        Network {
            amplifiers,
            initial_signal: Some(0),
            current: 0,
            idle: 0,
        }
    }

    /// Don't feed the first amplifier its starting signal.
    pub fn without_initial_signal(mut self) -> Self {
        self.initial_signal = None;
        self
    }

    /// Resumes the next active amplifier until it suspends, and routes any
    /// output it produced to the amplifier after it.
    pub fn turn(&mut self) -> Result<Turn> {
        let count = self.amplifiers.len();
        if count == 0 {
            return Err(Error::NoPhases);
        }

        let last = count - 1;
        if self.amplifiers[last].retired {
            return Err(Error::Halted(
                self.amplifiers[last].process.name().to_string(),
            ));
        }

        if let Some(signal) = self.initial_signal.take() {
            self.amplifiers[0].process.push_input(signal);
        }

        while self.amplifiers[self.current].retired {
            self.current = (self.current + 1) % count;
        }

        let current = self.current;
        let next = (current + 1) % count;
        let active = self.amplifiers.iter().filter(|a| !a.retired).count();
        self.current = next;

        let amplifier = &mut self.amplifiers[current];
        let state = amplifier.process.resume()?;
        match state {
            State::Output(signal) => {
                self.idle = 0;
                amplifier.last_signal = Some(signal);
                let values = amplifier.process.drain_output();
                debug!(amplifier = current, signal, "signal");
                for value in values {
                    self.amplifiers[next].process.push_input(value);
                }
            }
            State::Halted => {
                self.idle = 0;
                amplifier.retired = true;
                debug!(amplifier = current, "retired");
                if current == last {
                    return amplifier
                        .last_signal
                        .map(Turn::Finished)
                        .ok_or_else(|| Error::NoSignal(amplifier.process.name().to_string()));
                }
            }
            State::Blocked => {
                self.idle += 1;
                if self.idle >= active {
                    return Err(Error::Deadlock(active));
                }
            }
        }

        Ok(Turn::Suspended {
            amplifier: current,
            state,
        })
    }

    pub fn run(mut self) -> Result<i64> {
        loop {
            if let Turn::Finished(signal) = self.turn()? {
                return Ok(signal);
            }
        }
    }
}

/// Runs the amplifiers one after another, each exactly once, without
/// feedback.
pub fn serial_signal(program: &Program, phase_settings: &[i64]) -> Result<i64> {
    let mut signal = 0;
    for (index, &setting) in phase_settings.iter().enumerate() {
        let mut process =
            Process::with_inputs(format!("Amplifier {}", index), program, vec![setting, signal]);
        signal = loop {
            match process.resume()? {
                State::Output(value) => break value,
                State::Blocked => return Err(Error::InputExhausted(process.name().to_string())),
                State::Halted => return Err(Error::NoSignal(process.name().to_string())),
            }
        };
        debug!(amplifier = index, signal, "signal");
    }
    Ok(signal)
}

#[cfg(test)]
mod test {
    use super::*;

    fn program(data: &[i64]) -> Program {
        Program {
            data: data.to_vec().into_boxed_slice(),
        }
    }

    const FEEDBACK_1: &[i64] = &[
        3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
        1005, 28, 6, 99, 0, 0, 5,
    ];

    const FEEDBACK_2: &[i64] = &[
        3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001, 54, -5,
        54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53, 55, 53, 4, 53,
        1001, 56, -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
    ];

    #[test]
    fn output_signal_1() {
        let program = program(FEEDBACK_1);
        let signal = Network::new(&program, &[9, 8, 7, 6, 5]).run().unwrap();
        assert_eq!(signal, 139_629_729);
    }

    #[test]
    fn output_signal_2() {
        let program = program(FEEDBACK_2);
        let signal = Network::new(&program, &[9, 7, 8, 5, 6]).run().unwrap();
        assert_eq!(signal, 18216);
    }

    #[test]
    fn repeated_runs_agree() {
        let program = program(FEEDBACK_1);
        let first = Network::new(&program, &[5, 6, 7, 8, 9]).run().unwrap();
        let second = Network::new(&program, &[5, 6, 7, 8, 9]).run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_initial_signal_deadlocks() {
        let program = program(FEEDBACK_1);
        let result = Network::new(&program, &[9, 8, 7, 6, 5])
            .without_initial_signal()
            .run();
        assert!(matches!(result, Err(Error::Deadlock(5))));
    }

    #[test]
    fn single_amplifier_feeds_itself() {
        // Adds the phase to the incoming signal twice, reading the second
        // signal back from its own output.
        let program = program(&[
            3, 20, 3, 21, 1, 20, 21, 21, 4, 21, 3, 21, 1, 20, 21, 21, 4, 21, 99, 0, 0, 0,
        ]);
        assert_eq!(Network::new(&program, &[1]).run().unwrap(), 2);
    }

    #[test]
    fn amplifiers_take_turns() {
        // Reads the phase, then twice adds the phase to an incoming signal
        // and outputs the sum.
        let program = program(&[
            3, 19, 3, 20, 1, 19, 20, 20, 4, 20, 3, 20, 1, 19, 20, 20, 4, 20, 99, 0, 0,
        ]);
        let mut network = Network::new(&program, &[1, 10]);

        let turns: Vec<_> = (0..6).map(|_| network.turn().unwrap()).collect();
        assert_eq!(
            turns,
            vec![
                Turn::Suspended {
                    amplifier: 0,
                    state: State::Output(1)
                },
                Turn::Suspended {
                    amplifier: 1,
                    state: State::Output(11)
                },
                Turn::Suspended {
                    amplifier: 0,
                    state: State::Output(12)
                },
                Turn::Suspended {
                    amplifier: 1,
                    state: State::Output(22)
                },
                Turn::Suspended {
                    amplifier: 0,
                    state: State::Halted
                },
                Turn::Finished(22),
            ]
        );
        assert!(matches!(network.turn(), Err(Error::Halted(ref name)) if name == "Amplifier 1"));

        assert_eq!(Network::new(&program, &[1, 10]).run().unwrap(), 22);
    }

    #[test]
    fn last_amplifier_without_output() {
        let program = program(&[3, 0, 99]);
        let result = Network::new(&program, &[1, 2]).run();
        assert!(matches!(result, Err(Error::NoSignal(ref name)) if name == "Amplifier 1"));
    }

    #[test]
    fn empty_network() {
        let program = program(FEEDBACK_1);
        assert!(matches!(Network::new(&program, &[]).run(), Err(Error::NoPhases)));
    }

    #[test]
    fn serial_examples() {
        let program_1 = program(&[
            3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0,
        ]);
        assert_eq!(serial_signal(&program_1, &[4, 3, 2, 1, 0]).unwrap(), 43210);

        let program_2 = program(&[
            3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23, 23, 4, 23,
            99, 0, 0,
        ]);
        assert_eq!(serial_signal(&program_2, &[0, 1, 2, 3, 4]).unwrap(), 54321);

        let program_3 = program(&[
            3, 31, 3, 32, 1002, 32, 10, 32, 1001, 31, -2, 31, 1007, 31, 0, 33, 1002, 33, 7, 33, 1,
            33, 31, 31, 1, 32, 31, 31, 4, 31, 99, 0, 0, 0,
        ]);
        assert_eq!(serial_signal(&program_3, &[1, 0, 4, 3, 2]).unwrap(), 65210);
    }

    #[test]
    fn serial_amplifier_without_output() {
        let program = program(&[3, 0, 3, 0, 99]);
        assert!(matches!(
            serial_signal(&program, &[0, 1]),
            Err(Error::NoSignal(ref name)) if name == "Amplifier 0"
        ));
    }
}
