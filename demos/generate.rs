use text2image::{
    AspectRatio, Config, GenerationSettings, ImageGenerator, StylePreset,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    text2image::logger::init()?;

    let config = Config::from_env();
    let generator = ImageGenerator::from_config(&config)?;

    let settings = GenerationSettings::new("a lighthouse at dusk | a (glowing:1.4) jellyfish")
        .with_negative_prompt("text, watermark")
        .with_aspect_ratio(AspectRatio::Landscape)
        .with_style(StylePreset::Cinematic)
        .with_steps(45);

    println!("compiled: {}", text2image::compile(&settings));

    let on_progress: text2image::ProgressCallback =
        std::sync::Arc::new(|percent| println!("progress: {}%", percent));
    let image = generator.generate(settings, Some(on_progress)).await?;

    let file_name = image.download_file_name();
    tokio::fs::write(&file_name, image.decode_bytes()?).await?;
    println!("saved {}", file_name);

    Ok(())
}
