use chrono::Local;
use weather_now_core::{PlaceCandidate, WeatherDisplay};

pub fn print_weather(display: &WeatherDisplay) {
    print!("{}", format_weather(display));
}

pub fn format_weather(display: &WeatherDisplay) -> String {
    let current = &display.current;
    let mut out = String::new();

    out.push_str(&format!("{}\n", current.place));
    out.push_str(&format!("{}  ·  {}\n\n", current.date, Local::now().format("%-I:%M:%S %p")));
    out.push_str(&format!(
        "{}  {}{}  {}\n\n",
        current.icon.symbol(),
        current.temperature.value,
        current.temperature.unit,
        current.description.to_uppercase(),
    ));
    out.push_str(&format!(
        "  Feels like     {}{}\n",
        current.feels_like.value, current.feels_like.unit
    ));
    out.push_str(&format!("  Humidity       {}%\n", current.humidity_pct));
    out.push_str(&format!("  Wind           {}\n", current.wind));
    out.push_str(&format!("  Precipitation  {}\n", current.precipitation));

    if !display.hourly.is_empty() {
        out.push_str("\nHourly forecast\n");
        for hour in &display.hourly {
            out.push_str(&format!(
                "  {:>5}  {:<2}  {}\n",
                hour.time,
                hour.icon.symbol(),
                hour.temperature.degrees()
            ));
        }
    }

    if !display.daily.is_empty() {
        out.push_str("\nDaily forecast\n");
        for day in &display.daily {
            out.push_str(&format!(
                "  {}  {:<2}  H: {:>4}  L: {:>4}\n",
                day.weekday,
                day.icon.symbol(),
                day.high.degrees(),
                day.low.degrees()
            ));
        }
    }

    out
}

pub fn candidate_label(place: &PlaceCandidate) -> String {
    format!("{}  ({})", place.name, place.region_label())
}

pub fn print_candidates(places: &[PlaceCandidate]) {
    for place in places {
        println!("{}  [{:.4}, {:.4}]", candidate_label(place), place.lat, place.lon);
    }
}
