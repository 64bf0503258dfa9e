//! Driving a register to a target with relative steps only.
//!
//! Volume, bass and treble have no absolute "set" command: the amplifier
//! only offers up/down, each answered with the new value. [`converge`]
//! walks the register towards the target one round trip at a time.
//!
//! The walk is one-directional. A register whose step is larger than one
//! may end past the target; it is never walked back.

use std::ops::RangeInclusive;

use async_trait::async_trait;
use azur_core::{Error, Result};
use tracing::{debug, warn};

/// A register that can be moved one step at a time.
///
/// Each call performs one device round trip and returns the value the
/// device reports afterwards.
#[async_trait]
pub trait Stepper: Send {
    async fn step_up(&mut self) -> Result<i32>;
    async fn step_down(&mut self) -> Result<i32>;
}

/// Walk `stepper` to `target` and return the last value observed.
///
/// - `target` outside `bounds` is refused with [`Error::InvalidParameter`]
///   before any step is taken.
/// - With `current` unknown, one step down is taken to learn it; if the
///   device refuses that step as invalid data (already at the floor), one
///   step up is taken instead.
/// - If the value already equals `target`, no (further) steps are taken.
/// - Otherwise the register is stepped towards the target while it is
///   strictly on the approach side. A step that reports an unchanged value
///   does not end the walk; the walk gives up only after as many steps as
///   `bounds` has values, returning the last value with a warning.
pub async fn converge<S>(
    stepper: &mut S,
    target: i32,
    current: Option<i32>,
    bounds: RangeInclusive<i32>,
) -> Result<i32>
where
    S: Stepper + ?Sized,
{
    if !bounds.contains(&target) {
        return Err(Error::InvalidParameter(format!(
            "target {target} out of range {}..={}",
            bounds.start(),
            bounds.end()
        )));
    }

    let mut value = match current {
        Some(value) => value,
        None => match stepper.step_down().await {
            Ok(value) => value,
            Err(e) if e.is_invalid_data() => {
                debug!("learning step down refused, stepping up");
                stepper.step_up().await?
            }
            Err(e) => return Err(e),
        },
    };

    if value == target {
        return Ok(value);
    }

    let ascending = value < target;
    let max_steps = step_limit(&bounds);
    debug!(from = value, target, ascending, max_steps, "converging register");

    let mut steps = 0u64;
    while (ascending && value < target) || (!ascending && value > target) {
        if steps == max_steps {
            warn!(value, target, steps, "register did not reach target");
            break;
        }
        value = if ascending {
            stepper.step_up().await?
        } else {
            stepper.step_down().await?
        };
        steps += 1;
    }

    Ok(value)
}

/// One step per value in `bounds`: enough to cross the whole range at the
/// smallest step size.
fn step_limit(bounds: &RangeInclusive<i32>) -> u64 {
    let span = i64::from(*bounds.end()) - i64::from(*bounds.start());
    u64::try_from(span).map_or(0, |span| span + 1)
}
