//! Weather symbol dictionary for MET Norway condition codes.
//!
//! Symbol ids follow the yr.no weather symbol set
//! (https://github.com/nrkno/yr-weather-symbols, MIT licensed).

pub const ICON_BASE_URL: &str = "https://cdn.jsdelivr.net/gh/nrkno/yr-weather-symbols@8.0.1/dist/svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconEntry {
    pub symbol: &'static str,
    pub text: &'static str,
}

impl IconEntry {
    /// Single character stand-in for the icon, used on the terminal canvas.
    pub fn glyph(&self) -> &'static str {
        let text = self.text.to_lowercase();
        if text.contains("thunder") {
            "⚡"
        } else if text.contains("snow") {
            "*"
        } else if text.contains("sleet") {
            "%"
        } else if text.contains("rain") {
            "'"
        } else if text.contains("fog") {
            "="
        } else {
            match self.symbol {
                "01" => "o",
                "02" | "03" => "c",
                _ => "C",
            }
        }
    }
}

/// Sorted by key so lookups can binary search.
const DICTIONARY: &[(&str, IconEntry)] = &[
    ("clearsky", IconEntry { symbol: "01", text: "Clear sky" }),
    ("cloudy", IconEntry { symbol: "04", text: "Cloudy" }),
    ("fair", IconEntry { symbol: "02", text: "Fair" }),
    ("fog", IconEntry { symbol: "15", text: "Fog" }),
    ("heavyrain", IconEntry { symbol: "10", text: "Heavy rain" }),
    ("heavyrainandthunder", IconEntry { symbol: "11", text: "Heavy rain and thunder" }),
    ("heavyrainshowers", IconEntry { symbol: "41", text: "Heavy rain showers" }),
    ("heavyrainshowersandthunder", IconEntry { symbol: "25", text: "Heavy rain showers and thunder" }),
    ("heavysleet", IconEntry { symbol: "48", text: "Heavy sleet" }),
    ("heavysleetandthunder", IconEntry { symbol: "32", text: "Heavy sleet and thunder" }),
    ("heavysleetshowers", IconEntry { symbol: "43", text: "Heavy sleet showers" }),
    ("heavysleetshowersandthunder", IconEntry { symbol: "27", text: "Heavy sleet showers and thunder" }),
    ("heavysnow", IconEntry { symbol: "50", text: "Heavy snow" }),
    ("heavysnowandthunder", IconEntry { symbol: "34", text: "Heavy snow and thunder" }),
    ("heavysnowshowers", IconEntry { symbol: "45", text: "Heavy snow showers" }),
    ("heavysnowshowersandthunder", IconEntry { symbol: "29", text: "Heavy snow showers and thunder" }),
    ("lightrain", IconEntry { symbol: "46", text: "Light rain" }),
    ("lightrainandthunder", IconEntry { symbol: "30", text: "Light rain and thunder" }),
    ("lightrainshowers", IconEntry { symbol: "40", text: "Light rain showers" }),
    ("lightrainshowersandthunder", IconEntry { symbol: "24", text: "Light rain showers and thunder" }),
    ("lightsleet", IconEntry { symbol: "47", text: "Light sleet" }),
    ("lightsleetandthunder", IconEntry { symbol: "31", text: "Light sleet and thunder" }),
    ("lightsleetshowers", IconEntry { symbol: "42", text: "Light sleet showers" }),
    ("lightsnow", IconEntry { symbol: "49", text: "Light snow" }),
    ("lightsnowandthunder", IconEntry { symbol: "33", text: "Light snow and thunder" }),
    ("lightsnowshowers", IconEntry { symbol: "44", text: "Light snow showers" }),
    // MET Norway spells these two with a double "s".
    ("lightssleetshowersandthunder", IconEntry { symbol: "26", text: "Light sleet showers and thunder" }),
    ("lightssnowshowersandthunder", IconEntry { symbol: "28", text: "Light snow showers and thunder" }),
    ("partlycloudy", IconEntry { symbol: "03", text: "Partly cloudy" }),
    ("rain", IconEntry { symbol: "09", text: "Rain" }),
    ("rainandthunder", IconEntry { symbol: "22", text: "Rain and thunder" }),
    ("rainshowers", IconEntry { symbol: "05", text: "Rain showers" }),
    ("rainshowersandthunder", IconEntry { symbol: "06", text: "Rain showers and thunder" }),
    ("sleet", IconEntry { symbol: "12", text: "Sleet" }),
    ("sleetandthunder", IconEntry { symbol: "23", text: "Sleet and thunder" }),
    ("sleetshowers", IconEntry { symbol: "07", text: "Sleet showers" }),
    ("sleetshowersandthunder", IconEntry { symbol: "20", text: "Sleet showers and thunder" }),
    ("snow", IconEntry { symbol: "13", text: "Snow" }),
    ("snowandthunder", IconEntry { symbol: "14", text: "Snow and thunder" }),
    ("snowshowers", IconEntry { symbol: "08", text: "Snow showers" }),
    ("snowshowersandthunder", IconEntry { symbol: "21", text: "Snow showers and thunder" }),
];

pub fn lookup(stem: &str) -> Option<&'static IconEntry> {
    DICTIONARY
        .binary_search_by(|(key, _)| (*key).cmp(stem))
        .ok()
        .map(|idx| &DICTIONARY[idx].1)
}

/// Time-of-day variant carried as a suffix on a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    Day,
    Night,
    PolarTwilight,
    /// Code without a recognized suffix, e.g. "cloudy".
    None,
}

impl DayPhase {
    /// Suffix appended to the symbol id to pick the icon variant.
    pub fn icon_suffix(&self) -> &'static str {
        match self {
            DayPhase::Day => "d",
            DayPhase::Night => "n",
            DayPhase::PolarTwilight => "m",
            DayPhase::None => "",
        }
    }
}

/// A condition code split into its dictionary stem and day phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionCode<'a> {
    pub stem: &'a str,
    pub phase: DayPhase,
}

impl<'a> ConditionCode<'a> {
    pub fn parse(code: &'a str) -> Self {
        let split = code.rsplit_once('_').and_then(|(stem, suffix)| {
            let phase = match suffix {
                "day" => DayPhase::Day,
                "night" => DayPhase::Night,
                "polartwilight" => DayPhase::PolarTwilight,
                _ => return None,
            };
            Some(ConditionCode { stem, phase })
        });
        split.unwrap_or(ConditionCode {
            stem: code,
            phase: DayPhase::None,
        })
    }

    pub fn entry(&self) -> Option<&'static IconEntry> {
        lookup(self.stem)
    }

    /// Icon id such as "01d", or `None` when the stem is not in the dictionary.
    pub fn icon_id(&self) -> Option<String> {
        self.entry()
            .map(|entry| format!("{}{}", entry.symbol, self.phase.icon_suffix()))
    }
}

pub fn icon_url(icon_id: &str) -> String {
    format!("{ICON_BASE_URL}/{icon_id}.svg")
}
