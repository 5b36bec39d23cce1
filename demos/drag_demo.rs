use knob::{Knob, KnobCommand, KnobConfig};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = KnobConfig::builder()
        .title("Knob drag demo".to_string())
        .window_width(400)
        .window_height(400)
        .build();
    let mut knob = Knob::new(config)?;

    let (sender, receiver) = mpsc::channel();

    // Synthesize press-drag-release gestures: short tangential strokes at a
    // fixed radius from the knob center, alternating direction at random.
    thread::spawn(move || {
        let mut rng = rand::rng();
        let (center_x, center_y) = (200.0_f32, 200.0_f32);
        let radius = 120.0_f32;
        let mut angle = 0.0_f32;

        loop {
            let direction: f32 = if rng.random_range(0.0..1.0) < 0.5 {
                1.0
            } else {
                -1.0
            };
            let samples = rng.random_range(10..40);

            if sender.send(KnobCommand::BeginDrag).is_err() {
                break;
            }
            for _ in 0..samples {
                let step = direction * rng.random_range(0.01..0.04);
                let next = angle + step;
                let x = center_x + next.cos() * radius;
                let y = center_y + next.sin() * radius;
                let dx = x - (center_x + angle.cos() * radius);
                let dy = y - (center_y + angle.sin() * radius);
                angle = next;
                if sender.send(KnobCommand::Drag { dx, dy, x, y }).is_err() {
                    return;
                }
                thread::sleep(Duration::from_millis(16));
            }
            if sender.send(KnobCommand::EndDrag).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(400));
        }
    });

    println!("Displaying a knob driven by synthetic drag gestures:");
    println!("- strokes sweep tangentially around the dial in both directions");
    println!("- the indicator stops at the dead zone spanning the dial bottom");
    println!("Press Ctrl+C to exit");

    knob.show_with_commands(receiver)
}
