use crate::Phase;

/// Advance the pause countdown.
///
/// Returns true while the step must not touch the ball, which includes the
/// frame on which the countdown runs out.
pub fn tick_pause(phase: &mut Phase) -> bool {
    match *phase {
        Phase::Paused { frames_left } => {
            let frames_left = frames_left.saturating_sub(1);
            *phase = if frames_left == 0 {
                log::info!("Pause over, resuming play");
                Phase::Playing
            } else {
                Phase::Paused { frames_left }
            };
            true
        }
        Phase::Playing => false,
        Phase::Ended { .. } => true,
    }
}
