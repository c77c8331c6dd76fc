use crosswalk_sim::{Config, Simulation};

/// Ticks to simulate; data in the source study is recorded per hour of
/// one-second ticks.
const HORIZON: u64 = 3600;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(9_000_000);

    let config = Config::default();
    let mut sim = Simulation::new(&config, seed).expect("default configuration is valid");
    sim.advance_to(HORIZON).expect("simulation tick failed");

    println!("seed:          {seed}");
    println!("ticks:         {}", sim.tick());
    println!("conflicts:     {}", sim.conflicts());
    println!("crossed east:  {}", sim.crossed_east());
    println!("crossed west:  {}", sim.crossed_west());
    for (name, area) in [("west", sim.waiting_west()), ("east", sim.waiting_east())] {
        println!(
            "{name} queue:    generated {}, placed {}, discarded {}, waiting {}",
            area.generated(),
            area.placed(),
            area.discarded(),
            area.waiting(),
        );
    }
    let spawned: u64 = sim.lanes().iter().map(|lane| lane.placed()).sum();
    println!("vehicles in:   {spawned}");
}
