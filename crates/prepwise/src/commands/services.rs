//! Weather, assistant, image search and air quality handlers.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use tabled::Tabled;

use prepwise_api::services::{
    AirQuality, CurrentWeather, ForecastEntry, GeneratedImage, ImageResult,
};

use crate::cli::{AskArgs, DesignArgs, GlobalOpts, ImagesArgs, LocationArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

fn opt_number(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.0}{unit}"))
}

// ── Weather ─────────────────────────────────────────────────────────

fn weather_detail(w: &CurrentWeather) -> String {
    let mut lines = vec![
        format!("Location:    {}", w.name.as_deref().unwrap_or("-")),
        format!("Conditions:  {}", util::or_dash(w.summary())),
        format!("Temperature: {:.1}°C", w.main.temp),
        format!("Feels like:  {}", opt_number(w.main.feels_like, "°C")),
        format!("Humidity:    {}", opt_number(w.main.humidity, "%")),
    ];
    if let Some(wind) = &w.wind {
        lines.push(format!("Wind:        {:.1} m/s", wind.speed));
    }
    lines.join("\n")
}

pub async fn weather(
    ctx: &Context,
    args: &LocationArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let at = util::location(args)?;
    let current = ctx.portal.weather(at).await?;
    let out = output::render_single(&global.output, &current, weather_detail, |w| {
        format!("{:.1}", w.main.temp)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Temp")]
    temp: String,
    #[tabled(rename = "Conditions")]
    conditions: String,
    #[tabled(rename = "Rain")]
    rain: String,
}

impl From<&ForecastEntry> for ForecastRow {
    fn from(e: &ForecastEntry) -> Self {
        Self {
            time: e.dt_txt.clone().unwrap_or_else(|| {
                chrono::DateTime::from_timestamp(e.dt, 0)
                    .map_or_else(|| e.dt.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
            }),
            temp: format!("{:.1}°C", e.main.temp),
            conditions: e
                .weather
                .first()
                .map_or_else(|| "-".into(), |c| c.description.clone()),
            rain: e.pop.map_or_else(|| "-".into(), |p| format!("{:.0}%", p * 100.0)),
        }
    }
}

pub async fn forecast(
    ctx: &Context,
    args: &LocationArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let at = util::location(args)?;
    let forecast = ctx.portal.forecast(at).await?;
    if let Some(name) = forecast.city.as_ref().and_then(|c| c.name.as_deref()) {
        output::note(&format!("Forecast for {name}"), global.quiet);
    }
    let out = output::render_list(
        &global.output,
        &forecast.list,
        |e| ForecastRow::from(e),
        |e| e.dt.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Assistant ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct Answer {
    prompt: String,
    answer: String,
}

pub async fn ask(ctx: &Context, args: &AskArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let prompt = util::joined(&args.prompt);
    let answer = ctx.portal.ask(&prompt).await?;
    let reply = Answer { prompt, answer };
    let out = output::render_single(
        &global.output,
        &reply,
        |r| r.answer.clone(),
        |r| r.answer.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn design(ctx: &Context, args: DesignArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let prompt = util::joined(&args.prompt);
    let image = ctx.portal.design(&prompt).await?;

    match (&image, args.out) {
        (GeneratedImage::Inline { mime, data }, Some(path)) => {
            let bytes = BASE64.decode(data.trim()).map_err(|e| CliError::ServiceFailed {
                service: "Gemini".into(),
                message: format!("image data is not valid base64: {e}"),
            })?;
            std::fs::write(&path, &bytes)?;
            output::note(
                &format!("Wrote {mime} image ({} bytes) to {}", bytes.len(), path.display()),
                global.quiet,
            );
        }
        (GeneratedImage::Design(spec), Some(path)) => {
            let text = serde_json::to_string_pretty(spec)?;
            std::fs::write(&path, text)?;
            output::note(&format!("Wrote design to {}", path.display()), global.quiet);
        }
        (_, None) => {
            let out = output::render_single(&global.output, &image, design_detail, |i| {
                match i {
                    GeneratedImage::Inline { mime, .. } => mime.clone(),
                    GeneratedImage::Design(_) => "design".into(),
                }
            });
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

fn design_detail(image: &GeneratedImage) -> String {
    match image {
        GeneratedImage::Inline { mime, data } => format!(
            "Received a {mime} image ({} base64 characters). Pass --out FILE to save it.",
            data.len()
        ),
        GeneratedImage::Design(spec) => {
            serde_json::to_string_pretty(spec).unwrap_or_else(|_| spec.to_string())
        }
    }
}

// ── Image search ────────────────────────────────────────────────────

#[derive(Tabled)]
struct ImageRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    mime: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&ImageResult> for ImageRow {
    fn from(r: &ImageResult) -> Self {
        Self {
            title: util::or_dash(&r.title).to_owned(),
            mime: util::or_dash(&r.mime).to_owned(),
            url: r.url.clone(),
        }
    }
}

pub async fn images(
    ctx: &Context,
    args: &ImagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let query = util::joined(&args.query);
    let results = ctx.portal.images(&query, args.num).await?;
    if results.is_empty() {
        output::note("No images found.", global.quiet);
        return Ok(());
    }
    let out = output::render_list(
        &global.output,
        &results,
        |r| ImageRow::from(r),
        |r| r.url.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Air quality ─────────────────────────────────────────────────────

fn air_detail(aq: &AirQuality) -> String {
    let mut lines = Vec::new();
    match aq.universal() {
        Some(index) => {
            lines.push(format!(
                "{}: {}",
                index.display_name,
                index.aqi.map_or_else(|| "-".into(), |v| v.to_string())
            ));
            lines.push(format!(
                "Category:  {}",
                index.category.as_deref().unwrap_or("-")
            ));
            lines.push(format!(
                "Dominant:  {}",
                index.dominant_pollutant.as_deref().unwrap_or("-")
            ));
        }
        None => lines.push("No air quality index reported.".into()),
    }
    if let Some(at) = &aq.date_time {
        lines.push(format!("Measured:  {at}"));
    }
    if !aq.health_recommendations.is_empty() {
        lines.push(String::new());
        for (group, advice) in &aq.health_recommendations {
            lines.push(format!("{group}: {advice}"));
        }
    }
    lines.join("\n")
}

pub async fn air(ctx: &Context, args: &LocationArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let at = util::location(args)?;
    let quality = ctx.portal.air_quality(at).await?;
    let out = output::render_single(&global.output, &quality, air_detail, |aq| {
        aq.universal()
            .and_then(|i| i.aqi)
            .map_or_else(|| "-".into(), |v| v.to_string())
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_readings_show_dash() {
        assert_eq!(opt_number(None, "%"), "-");
        assert_eq!(opt_number(Some(71.6), "%"), "72%");
    }

    #[test]
    fn inline_design_points_at_out_flag() {
        let image = GeneratedImage::Inline {
            mime: "image/png".into(),
            data: "iVBORw0KGgo=".into(),
        };
        let text = design_detail(&image);
        assert!(text.contains("image/png"));
        assert!(text.contains("--out"));
    }
}
