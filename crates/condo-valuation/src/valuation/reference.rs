use super::domain::PsfRecord;
use super::money::group_thousands;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static REFERENCE_TABLE: OnceLock<PsfTable> = OnceLock::new();

/// City whose detailed data stands in when nothing else answers.
pub const ANCHOR_CITY: &str = "Toronto";

/// Base historical and current 5-year fixed mortgage rates, in percent.
pub const BASE_HISTORICAL_INTEREST_RATE: f64 = 2.8;
pub const CURRENT_INTEREST_RATE: f64 = 4.9;

type CityRow = (&'static str, u32, u32, u32);

const DETAILED_ROWS: &[(i32, &str, &[CityRow])] = &[
    (
        2021,
        "Rapid Acceleration. Low interest rates fueled demand.",
        &[
            ("Toronto", 1350, 1450, 1400),
            ("Markham", 1300, 1420, 1360),
            ("Richmond Hill", 1300, 1420, 1360),
            ("Vaughan", 1280, 1380, 1330),
            ("Scarborough", 1240, 1350, 1295),
            ("Mississauga", 1200, 1320, 1260),
            ("Brampton", 1150, 1280, 1215),
            ("Pickering", 1150, 1280, 1215),
            ("Ajax", 1120, 1250, 1185),
        ],
    ),
    (
        2022,
        "The Peak. Prices hit record highs in Q3 2022.",
        &[
            ("Toronto", 1400, 1480, 1440),
            ("Markham", 1350, 1450, 1400),
            ("Richmond Hill", 1350, 1450, 1400),
            ("Vaughan", 1320, 1450, 1385),
            ("Scarborough", 1280, 1420, 1350),
            ("Mississauga", 1240, 1380, 1310),
            ("Brampton", 1190, 1350, 1270),
            ("Pickering", 1180, 1340, 1260),
            ("Ajax", 1150, 1330, 1240),
        ],
    ),
    (
        2023,
        "Correction Begins. Sales slowed significantly.",
        &[
            ("Toronto", 1300, 1420, 1360),
            ("Markham", 1250, 1380, 1315),
            ("Richmond Hill", 1250, 1380, 1315),
            ("Vaughan", 1230, 1350, 1290),
            ("Scarborough", 1180, 1320, 1250),
            ("Mississauga", 1150, 1310, 1230),
            ("Brampton", 1100, 1280, 1190),
            ("Pickering", 1100, 1260, 1180),
            ("Ajax", 1080, 1250, 1165),
        ],
    ),
    (
        2024,
        "Significant Correction. New project launches are priced aggressively lower.",
        &[
            ("Toronto", 1250, 1400, 1325),
            ("Markham", 1220, 1350, 1285),
            ("Richmond Hill", 1220, 1350, 1285),
            ("Vaughan", 1200, 1330, 1265),
            ("Scarborough", 1150, 1300, 1225),
            ("Mississauga", 1120, 1280, 1200),
            ("Brampton", 1080, 1250, 1165),
            ("Pickering", 1080, 1240, 1160),
            ("Ajax", 1060, 1230, 1145),
        ],
    ),
];

const GENERAL_ROWS: &[(i32, PsfRecord)] = &[
    (
        2019,
        PsfRecord::curated(
            1070.0,
            1150.0,
            1110.0,
            "Steady Growth. Prices rose steadily across Greater Toronto Area.",
        ),
    ),
    (
        2020,
        PsfRecord::curated(
            1150.0,
            1377.0,
            1264.0,
            "Pandemic Resilience. Despite COVID-19 pauses, unsold inventory prices in Greater Toronto Area held strong.",
        ),
    ),
    (
        2025,
        PsfRecord::curated(
            1030.0,
            1325.0,
            1178.0,
            "Buyers Market. Greater Toronto Area unsold inventory hovered ~$1,325, but new launches dropped further. Many projects were delayed or cancelled.",
        ),
    ),
    (
        2026,
        PsfRecord::curated(
            1000.0,
            1100.0,
            1050.0,
            "Forecast: Continued Downward Pressure. Prices are projected to face further declines or remain significantly suppressed across the Greater Toronto Area, favoring buyers.",
        ),
    ),
];

/// Two-tier PPSF reference data: per-city detail for the curated years and a
/// year-only table for the years around them.
#[derive(Debug, Clone, Default)]
pub struct PsfTable {
    detailed: BTreeMap<i32, BTreeMap<&'static str, PsfRecord>>,
    general: BTreeMap<i32, PsfRecord>,
}

impl PsfTable {
    /// Curated GTA table, built on first use and shared for the life of the
    /// process.
    pub fn reference() -> &'static PsfTable {
        REFERENCE_TABLE.get_or_init(|| {
            let detailed = DETAILED_ROWS.iter().flat_map(|(year, headline, rows)| {
                rows.iter().map(move |&(city, min, max, avg)| {
                    let context = format!(
                        "{headline} {} averaged ~${}–${} PSF.",
                        display_label(city),
                        group_thousands(u64::from(min)),
                        group_thousands(u64::from(max))
                    );
                    let record = PsfRecord {
                        min_psf: f64::from(min),
                        max_psf: f64::from(max),
                        avg_psf: f64::from(avg),
                        market_context: Cow::Owned(context),
                    };
                    (*year, city, record)
                })
            });
            PsfTable::from_entries(detailed, GENERAL_ROWS.iter().cloned())
        })
    }

    pub fn from_entries<D, G>(detailed: D, general: G) -> Self
    where
        D: IntoIterator<Item = (i32, &'static str, PsfRecord)>,
        G: IntoIterator<Item = (i32, PsfRecord)>,
    {
        let mut table = PsfTable::default();
        for (year, city, record) in detailed {
            table.detailed.entry(year).or_default().insert(city, record);
        }
        table.general.extend(general);
        table
    }

    pub fn detailed(&self, year: i32, city: &str) -> Option<&PsfRecord> {
        self.detailed.get(&year).and_then(|cities| cities.get(city))
    }

    pub fn general(&self, year: i32) -> Option<&PsfRecord> {
        self.general.get(&year)
    }

    /// Earliest and latest year present in either tier.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let years = self.detailed.keys().chain(self.general.keys());
        let min = years.clone().min()?;
        let max = years.max()?;
        Some((*min, *max))
    }

    pub fn latest_detailed_for(&self, city: &str) -> Option<(i32, &PsfRecord)> {
        self.detailed
            .iter()
            .rev()
            .find_map(|(year, cities)| cities.get(city).map(|record| (*year, record)))
    }

    pub fn detailed_entries(&self) -> impl Iterator<Item = (i32, &'static str, &PsfRecord)> {
        self.detailed.iter().flat_map(|(year, cities)| {
            cities
                .iter()
                .map(move |(city, record)| (*year, *city, record))
        })
    }

    pub fn general_entries(&self) -> impl Iterator<Item = (i32, &PsfRecord)> {
        self.general.iter().map(|(year, record)| (*year, record))
    }

    pub fn detailed_cities(&self) -> Vec<&'static str> {
        let mut cities: Vec<&'static str> = self
            .detailed
            .values()
            .flat_map(|cities| cities.keys().copied())
            .collect();
        cities.sort_unstable();
        cities.dedup();
        cities
    }
}

fn display_label(city: &str) -> &str {
    match city {
        "Toronto" => "Downtown Toronto",
        other => other,
    }
}
