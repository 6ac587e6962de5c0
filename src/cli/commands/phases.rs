use traffic_light::{Color, TrafficLightConfig};

pub struct PhasesCommand;

impl PhasesCommand {
    pub fn execute(&self, config: &TrafficLightConfig) {
        println!("🚦 PHASES:");
        for color in Color::ALL {
            println!(
                "   {:<6} {:>5.1}s  → {}",
                color.as_str(),
                config.phases.get(color),
                color.next()
            );
        }
        println!("⏱️  Full cycle: {:.1}s", config.phases.cycle_length());
    }
}
