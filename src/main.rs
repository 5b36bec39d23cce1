use knob::{Knob, KnobCommand, KnobConfig};
use std::env;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Parse --title / --max-level / --angles min max from the command line
    let mut title = "Knob".to_string();
    let mut max_level: u32 = 10;
    let mut min_angle: i32 = knob::DEFAULT_MIN_ANGLE;
    let mut max_angle: i32 = knob::DEFAULT_MAX_ANGLE;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => {
                if let Some(value) = args.next() {
                    title = value;
                }
            }
            "--max-level" => {
                if let Some(value) = args.next() {
                    if let Ok(value) = value.parse::<u32>() {
                        max_level = value;
                    }
                }
            }
            "--angles" => {
                if let (Some(min), Some(max)) = (args.next(), args.next()) {
                    if let (Ok(min), Ok(max)) = (min.parse::<i32>(), max.parse::<i32>()) {
                        min_angle = min;
                        max_angle = max;
                    }
                }
            }
            _ => {}
        }
    }

    let config = KnobConfig::builder()
        .title(title)
        .max_level(max_level)
        .min_angle(min_angle)
        .max_angle(max_angle)
        .build();
    let mut knob = Knob::new(config)?;

    // Lines piped to stdin set the rotation directly, in degrees; values
    // landing in the forbidden arc are ignored by the engine.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Ok(rotation) = line.trim().parse::<i32>() {
                if sender.send(KnobCommand::SetRotation(rotation)).is_err() {
                    break;
                }
            }
        }
    });

    knob.show_with_commands(receiver)
}
