use brushbuddy_core::TRACKS;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(TRACKS)?);
        return Ok(());
    }
    for track in TRACKS {
        println!("{} {:<14} {}", track.icon, track.title, track.file);
    }
    Ok(())
}
