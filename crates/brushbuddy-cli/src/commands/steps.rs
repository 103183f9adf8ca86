use brushbuddy_core::presentation::format_clock;
use brushbuddy_core::Config;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Config::load_or_default().catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }
    for (i, step) in catalog.iter().enumerate() {
        println!(
            "{}. {:<20} {:>5}  {}",
            i + 1,
            step.title,
            format_clock(u64::from(step.duration_secs)),
            step.description
        );
    }
    println!("total: {}", format_clock(catalog.total_duration_secs()));
    Ok(())
}
