use crate::models::device::{Device, DeviceCatalog, Direction};

const INPUT_KEYWORDS: [&str; 3] = ["input", "microphone", "mic"];
const OUTPUT_KEYWORDS: [&str; 3] = ["output", "speaker", "playback"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    BeforeMarker,
    InSection,
}

/// Streaming parser for the capture binary's device listing.
///
/// The listing is free-form log text, not a data format, so the parser is a
/// two-state line classifier:
///
/// ```text
/// BeforeMarker ──section marker line──▶ InSection
/// ```
///
/// Before the marker every line is ignored. Inside the section, a line that
/// contains a double-quoted name is classified by keyword:
///
/// | Keywords (case-insensitive)         | Direction |
/// |-------------------------------------|-----------|
/// | `input`, `microphone`, `mic`        | Input     |
/// | `output`, `speaker`, `playback`     | Output    |
/// | both sets, or neither               | dropped   |
///
/// The keyword sets are an approximation. Device names that carry none of
/// these words (or both) are not listed, and localized or reformatted ffmpeg
/// builds can defeat the classification entirely.
#[derive(Debug)]
pub struct DeviceCatalogParser {
    marker: String,
    section: Section,
    catalog: DeviceCatalog,
}

impl DeviceCatalogParser {
    pub fn new(section_marker: impl Into<String>) -> Self {
        Self {
            marker: section_marker.into(),
            section: Section::BeforeMarker,
            catalog: DeviceCatalog::default(),
        }
    }

    /// Feeds one diagnostic line.
    ///
    /// Returns the device if the line added a new entry to the catalog.
    pub fn feed(&mut self, line: &str) -> Option<Device> {
        if self.section == Section::BeforeMarker {
            if line.contains(&self.marker) {
                self.section = Section::InSection;
            }
            return None;
        }

        let name = quoted_name(line)?;
        let device = Device {
            name: name.to_string(),
            direction: classify(line),
        };
        if device.direction == Direction::Unknown {
            log::debug!("Dropping unclassifiable device line: {}", line);
            return None;
        }
        self.catalog.insert(&device).then_some(device)
    }

    /// Whether the section marker has been seen.
    pub fn in_section(&self) -> bool {
        self.section == Section::InSection
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    pub fn finish(self) -> DeviceCatalog {
        self.catalog
    }
}

/// Parses a complete listing in one go.
pub fn parse<I, S>(section_marker: &str, lines: I) -> DeviceCatalog
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = DeviceCatalogParser::new(section_marker);
    for line in lines {
        parser.feed(line.as_ref());
    }
    parser.finish()
}

/// Classifies a listing line by keyword. Ambiguous lines are `Unknown`.
pub fn classify(line: &str) -> Direction {
    let lower = line.to_lowercase();
    let input = INPUT_KEYWORDS.iter().any(|k| lower.contains(k));
    let output = OUTPUT_KEYWORDS.iter().any(|k| lower.contains(k));
    match (input, output) {
        (true, false) => Direction::Input,
        (false, true) => Direction::Output,
        _ => Direction::Unknown,
    }
}

/// First non-empty `"..."` substring of `line`.
fn quoted_name(line: &str) -> Option<&str> {
    let mut rest = line;
    loop {
        let (_, after_open) = rest.split_once('"')?;
        let (name, after_close) = after_open.split_once('"')?;
        if !name.is_empty() {
            return Some(name);
        }
        rest = after_close;
    }
}
