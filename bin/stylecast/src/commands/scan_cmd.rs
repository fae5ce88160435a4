use stylecast_scanner::{snapshot_from_html, Scanner};

pub async fn run(file: &str) -> anyhow::Result<()> {
    let html = tokio::fs::read_to_string(file).await?;
    let snapshot = snapshot_from_html(&html);
    let detections = Scanner::new().scan(&snapshot);

    if detections.is_empty() {
        println!("No likely product images found.");
        return Ok(());
    }
    println!("{} likely product image(s):", detections.len());
    for detection in &detections {
        println!(
            "  node {:>4}  {:>4.0}x{:<4.0}  {}",
            detection.node_key,
            detection.rect.width,
            detection.rect.height,
            detection.image_url
        );
    }
    Ok(())
}
