pub mod config;
pub mod phases;
pub mod run;

pub fn show_how_to_run() {
    println!("🚦 traffic-light - three-phase countdown timer");
    println!();
    println!("To get started:");
    println!("  ▶️  traffic-light run             # Start the light");
    println!("  ⏱️  traffic-light run --seconds 20 # Run for a fixed time");
    println!("  📋 traffic-light phases          # Show phase durations");
    println!("  ⚙️  traffic-light config init     # Write traffic-light.toml");
    println!();
    println!("While running: p = play/pause, s = start, x = pause, r = reset, q = quit");
}
