use super::amplifier::{serial_signal, Network};
use super::error::{Error, Result};
use super::process::Process;
use super::program::Program;
use itertools::{iproduct, Itertools};
use std::collections::HashSet;
use tracing::{debug, info, trace};

/// How the amplifiers are wired together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    Serial,
    Feedback,
}

impl Wiring {
    pub fn signal(self, program: &Program, phase_settings: &[i64]) -> Result<i64> {
        match self {
            Wiring::Serial => serial_signal(program, phase_settings),
            Wiring::Feedback => Network::new(program, phase_settings).run(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Best {
    pub signal: i64,
    pub phase_settings: Vec<i64>,
}

/// Tries every ordering of `phase_settings` and keeps the strongest signal.
///
/// Ties go to the ordering found first. Any failing run aborts the search.
pub fn find_max_signal(program: &Program, phase_settings: &[i64], wiring: Wiring) -> Result<Best> {
    if phase_settings.is_empty() {
        return Err(Error::NoPhases);
    }

    let mut seen = HashSet::new();
    for &setting in phase_settings {
        if !seen.insert(setting) {
            return Err(Error::DuplicatePhase(setting));
        }
    }

    let mut best: Option<Best> = None;
    for ordering in phase_settings
        .iter()
        .copied()
        .permutations(phase_settings.len())
    {
        let signal = wiring.signal(program, &ordering)?;
        debug!(?ordering, signal, "tried ordering");
        if best.as_ref().map_or(true, |best| signal > best.signal) {
            best = Some(Best {
                signal,
                phase_settings: ordering,
            });
        }
    }

    let best = best.ok_or(Error::NoPhases)?;
    info!(signal = best.signal, phase_settings = ?best.phase_settings, ?wiring, "strongest signal");
    Ok(best)
}

/// Runs the program with `noun` and `verb` written to addresses 1 and 2 and
/// returns what it leaves at address 0.
pub fn run_with_noun_verb(program: &Program, noun: i64, verb: i64) -> Result<i64> {
    let mut process = Process::new("Gravity assist", program);
    process.set(1, noun)?;
    process.set(2, verb)?;
    process.run()?;
    Ok(process.memory()[0])
}

/// Searches nouns and verbs in `0..100` for a run leaving `expected_result`
/// at address 0.
///
/// A candidate that reads or writes outside memory just doesn't match.
pub fn find_noun_verb(program: &Program, expected_result: i64) -> Result<Option<(i64, i64)>> {
    for (noun, verb) in iproduct!(0..100, 0..100) {
        match run_with_noun_verb(program, noun, verb) {
            Ok(result) if result == expected_result => {
                info!(noun, verb, "found inputs");
                return Ok(Some((noun, verb)));
            }
            Ok(_) => {}
            Err(Error::OutOfBounds { address, .. }) => {
                trace!(noun, verb, address, "out of bounds");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}
