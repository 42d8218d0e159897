//! WebVTT document parsing
//!
//! Turns one cue-file payload into an ordered cue list and a region map.
//! Errors are recovered at three levels:
//! - a bad header rejects the whole document
//! - a bad cue timing line drops that cue and resumes at the next blank line
//! - a bad setting drops only that setting (see [`Cue::apply_settings`])

use crate::cue::Cue;
use crate::error::{Result, WebVttError};
use crate::parser::settings::{parse_property_value_pair, parse_settings_line, SettingsMap};
use crate::parser::timestamp::{parse_hhmmss, parse_timestamp_map, ClockTime};
use crate::region::{Region, RegionMap};
use crate::timing::{TimePoint, Timing};

const BOM: char = '\u{feff}';
const ARROW: &str = "-->";

/// Result of parsing one payload
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Cues in file order
    pub cues: Vec<Cue>,
    pub regions: RegionMap,
}

/// Parse a complete document
///
/// `display_offset_ms` is the transport-supplied PTS offset subtracted from
/// the `X-TIMESTAMP-MAP` offset.
pub fn parse_document(text: &str, display_offset_ms: i64) -> Result<ParsedDocument> {
    let mut cursor = LineCursor::new(text);
    check_header(cursor.next_line())?;

    let mut parser = DocumentParser::default();
    let mut document = ParsedDocument::default();

    parser.parse_preamble(&mut cursor, display_offset_ms, &mut document.regions);

    while let Some(line) = cursor.next_non_empty() {
        match parser.next_cue(line, &mut cursor) {
            Ok(Some(cue)) => document.cues.push(cue),
            Ok(None) => {}
            Err(e) => {
                tracing::info!("Skipping cue: {}", e);
                cursor.skip_to_blank();
            }
        }
    }

    tracing::debug!(
        cues = document.cues.len(),
        regions = document.regions.len(),
        "Parsed WebVTT document"
    );
    Ok(document)
}

/// Optional BOM, `WEBVTT`, then end of line or whitespace
fn check_header(line: Option<&str>) -> Result<()> {
    let line = line.unwrap_or_default();
    let line = line.strip_prefix(BOM).unwrap_or(line);

    let valid = match line.strip_prefix("WEBVTT") {
        Some(rest) => rest.chars().next().map_or(true, char::is_whitespace),
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(WebVttError::DocumentFormat(format!("bad WEBVTT header {line:?}")))
    }
}

/// Line reader that can step back to an earlier line
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    fn next_non_empty(&mut self) -> Option<&'a str> {
        while let Some(line) = self.next_line() {
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Consume lines up to and including the next blank line
    fn skip_to_blank(&mut self) {
        while let Some(line) = self.next_line() {
            if line.is_empty() {
                break;
            }
        }
    }
}

#[derive(Debug, Default)]
struct DocumentParser {
    /// `LOCAL` anchor all cue times are measured from
    local_time: ClockTime,
    /// Added to every cue after anchoring
    time_offset_ms: i64,
}

impl DocumentParser {
    /// Scan header blocks until the first cue
    fn parse_preamble(
        &mut self,
        cursor: &mut LineCursor<'_>,
        display_offset_ms: i64,
        regions: &mut RegionMap,
    ) {
        loop {
            let Some(line) = cursor.next_non_empty() else {
                break;
            };
            // Position of `line` itself, so a rewind re-reads it
            let line_pos = cursor.position() - 1;

            if line.contains("X-TIMESTAMP-MAP") {
                let map = parse_timestamp_map(line);
                if let Some(local) = map.local {
                    self.local_time = local;
                }
                self.time_offset_ms = map.pts_offset_ms - display_offset_ms;
                tracing::info!(
                    "Offset from index file: {} offset from data packet: {} overall offset to apply: {}",
                    map.pts_offset_ms,
                    display_offset_ms,
                    self.time_offset_ms
                );
            } else if line.contains("REGION") {
                let region = Region::from_settings(&read_region_settings(cursor));
                if regions.contains_key(&region.id) {
                    tracing::warn!("Duplicate region id {:?} ignored", region.id);
                } else {
                    regions.insert(region.id.clone(), region);
                }
            } else if line.contains("STYLE") {
                tracing::info!("Found STYLE block, not supported - skipping");
                cursor.skip_to_blank();
            } else if line.contains("NOTE") {
                tracing::debug!("Found NOTE block - skipping");
                cursor.skip_to_blank();
            } else if line.contains(ARROW) || cursor.peek().is_some_and(|l| l.contains(ARROW)) {
                cursor.rewind(line_pos);
                break;
            } else {
                tracing::debug!("Ignoring header line {:?}", line);
            }
        }
    }

    /// Parse one cue starting at `line`
    ///
    /// `Ok(None)` when the input ran out or the cue was discarded.
    fn next_cue<'a>(&self, mut line: &'a str, cursor: &mut LineCursor<'a>) -> Result<Option<Cue>> {
        if line.starts_with("NOTE") {
            tracing::debug!("NOTE found in WebVTT cue list");
            cursor.skip_to_blank();
            match cursor.next_non_empty() {
                Some(next) => line = next,
                None => return Ok(None),
            }
        }

        let mut identifier = None;
        if !line.contains(ARROW) {
            identifier = Some(line);
            match cursor.next_line() {
                // A lone line followed by a blank is not a cue; the next block is untouched
                Some("") => {
                    tracing::info!("Ignoring stray line {:?} without cue timing", line);
                    return Ok(None);
                }
                Some(next) => line = next,
                None => return Ok(None),
            }
        }

        let (timing, settings) = self.parse_cue_header(line)?;

        let mut cue = Cue::new(timing);
        if let Some(id) = identifier {
            cue.set_identifier(id);
        }
        cue.apply_offset(self.time_offset_ms);
        cue.apply_settings(&settings);

        while let Some(text) = cursor.next_line() {
            if text.is_empty() {
                break;
            }
            cue.add_text_line(text);
        }

        if cue.timing().is_empty() {
            tracing::warn!("Dropping cue with empty interval {}", cue.timing());
            return Ok(None);
        }

        Ok(Some(cue))
    }

    /// `<start> --> <end> [settings...]`
    fn parse_cue_header(&self, line: &str) -> Result<(Timing, SettingsMap)> {
        if !line.contains(ARROW) {
            return Err(WebVttError::CueFormat(format!("missing --> delimiter in {line:?}")));
        }

        let mut tokens = line.split_whitespace();
        let begin = self.parse_cue_time(tokens.next(), "start")?;
        if tokens.next() != Some(ARROW) {
            return Err(WebVttError::CueFormat(format!("bad --> delimiter in {line:?}")));
        }
        let end = self.parse_cue_time(tokens.next(), "end")?;

        let rest: Vec<&str> = tokens.collect();
        Ok((Timing::new(begin, end), parse_settings_line(&rest.join(" "))))
    }

    fn parse_cue_time(&self, token: Option<&str>, which: &str) -> Result<TimePoint> {
        let token = token.unwrap_or_default();
        let time = parse_hhmmss(token)
            .map_err(|_| WebVttError::CueFormat(format!("bad {which} time {token:?}")))?;
        Ok(TimePoint::from_millis(time.relative_to(&self.local_time)))
    }
}

/// Read `key:value` lines up to the next blank line, first key wins
fn read_region_settings(cursor: &mut LineCursor<'_>) -> SettingsMap {
    let mut settings = SettingsMap::new();
    while let Some(line) = cursor.next_line() {
        if line.is_empty() {
            break;
        }
        match parse_property_value_pair(line) {
            Ok((key, value)) => {
                settings
                    .entry(key.to_string())
                    .or_insert_with(|| value.to_string());
            }
            Err(e) => tracing::info!("Ignoring region line {:?}: {}", line, e),
        }
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::{Align, LineAlign};
    use crate::region::{Anchor, Scroll};

    fn parse(text: &str) -> ParsedDocument {
        parse_document(text, 0).unwrap()
    }

    fn begin_ms(doc: &ParsedDocument) -> Vec<i64> {
        doc.cues.iter().map(|c| c.timing().begin.as_millis()).collect()
    }

    #[test]
    fn test_good_headers() {
        for header in ["WEBVTT", "WEBVTT ", "WEBVTT - header", "WEBVTT\t- header", "\u{feff}WEBVTT"] {
            let text = format!("{header}\n\n00:01.000 --> 00:02.000\nhello\n");
            let doc = parse_document(&text, 0).unwrap();
            assert_eq!(doc.cues.len(), 1, "header {:?}", header);
        }
    }

    #[test]
    fn test_bad_headers() {
        for header in [" WEBVTT", "\n WEBVTT", "WOBVTT", "WEBVTTX", ""] {
            let text = format!("{header}\n\n00:01.000 --> 00:02.000\nhello\n");
            let result = parse_document(&text, 0);
            assert!(
                matches!(result, Err(WebVttError::DocumentFormat(_))),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_simple_cues() {
        let doc = parse(
            "WEBVTT\n\n1\n00:01:31.000 --> 00:01:33.000 align:start line:0%\nline one\nline two\n\n00:01:34.000 --> 00:01:35.500\nthree\n",
        );
        assert_eq!(doc.cues.len(), 2);

        let first = &doc.cues[0];
        assert_eq!(first.identifier(), Some("1"));
        assert_eq!(first.timing(), Timing::from_millis(91_000, 93_000));
        assert_eq!(first.lines(), ["line one", "line two"]);
        assert_eq!(first.cue_box().text_align, Align::Start);
        assert_eq!(first.cue_box().line, Some(0));
        assert!(!first.cue_box().snap_to_lines);

        let second = &doc.cues[1];
        assert_eq!(second.identifier(), None);
        assert_eq!(second.timing(), Timing::from_millis(94_000, 95_500));
        assert_eq!(second.lines(), ["three"]);
    }

    #[test]
    fn test_bad_cue_header_skips_only_that_cue() {
        let doc = parse(
            "WEBVTT\n\n00:01:37.000-->00:01:39.000\nbad one\n\n00:01:40.000 --> 00:01:41.000\ngood\n",
        );
        assert_eq!(doc.cues.len(), 1);
        assert_eq!(doc.cues[0].lines(), ["good"]);

        for bad in ["->", "blah", "00:112:39.000 --> 00:113:00.000", "00:01.000 -> 00:02.000"] {
            let text = format!("WEBVTT\n\n{bad}\ntext\n\n00:05.000 --> 00:06.000\nok\n");
            let doc = parse(&text);
            assert_eq!(doc.cues.len(), 1, "header {:?}", bad);
            assert_eq!(doc.cues[0].lines(), ["ok"]);
        }
    }

    #[test]
    fn test_tab_separated_header() {
        let doc = parse("WEBVTT\n\n00:01.000\t-->\t00:02.000\talign:left\nhi\n");
        assert_eq!(doc.cues.len(), 1);
        assert_eq!(doc.cues[0].cue_box().text_align, Align::Left);
    }

    #[test]
    fn test_timestamp_map_rebases_cues() {
        let doc = parse(
            "WEBVTT\nX-TIMESTAMP-MAP=MPEGTS:900000,LOCAL:00:00:05.000\n\n00:01:29.000 --> 00:01:31.000\ntext\n",
        );
        assert_eq!(begin_ms(&doc), vec![94_000]);
        assert_eq!(doc.cues[0].offset_ms(), 10_000);
    }

    #[test]
    fn test_display_offset_subtracted() {
        let text = "WEBVTT\nX-TIMESTAMP-MAP=MPEGTS:900000,LOCAL:00:00:00.000\n\n00:00:10.000 --> 00:00:11.000\ntext\n";
        let doc = parse_document(text, 4000).unwrap();
        assert_eq!(begin_ms(&doc), vec![16_000]);
    }

    #[test]
    fn test_no_timestamp_map_means_no_offset() {
        let doc = parse_document("WEBVTT\n\n00:00:10.000 --> 00:00:11.000\ntext\n", 4000).unwrap();
        assert_eq!(begin_ms(&doc), vec![10_000]);
    }

    #[test]
    fn test_regions() {
        let doc = parse(
            "WEBVTT\n\nREGION\nid:fred\nwidth:40%\nlines:3\nregionanchor:0%,100%\nviewportanchor:10%,90%\nscroll:up\n\nREGION\nid:bill\nwidth:40%\nregionanchor:100%,100%\nviewportanchor:90%,90%\n\n00:00.000 --> 00:20.000 region:fred align:left\nHi, my name is Fred\n",
        );
        assert_eq!(doc.regions.len(), 2);
        let fred = &doc.regions["fred"];
        assert_eq!(fred.width, 4000);
        assert_eq!(fred.scroll, Scroll::Up);
        assert_eq!(fred.viewport_anchor, Anchor { x: 1000, y: 9000 });
        let bill = &doc.regions["bill"];
        assert_eq!(bill.region_anchor, Anchor { x: 10000, y: 10000 });
        assert_eq!(bill.viewport_anchor, Anchor { x: 9000, y: 9000 });
        assert_eq!(bill.scroll, Scroll::None);

        assert_eq!(doc.cues.len(), 1);
        assert_eq!(doc.cues[0].region_id(), Some("fred"));
    }

    #[test]
    fn test_first_region_with_id_wins() {
        let doc = parse("WEBVTT\n\nREGION\nid:r\nlines:2\n\nREGION\nid:r\nlines:5\n\n00:00.000 --> 00:01.000\nx\n");
        assert_eq!(doc.regions["r"].lines, 2);
    }

    #[test]
    fn test_style_and_note_blocks_skipped() {
        let doc = parse(
            "WEBVTT\n\nSTYLE\n::cue { color: red }\n\nNOTE a comment\nwith --> arrow\n\n00:01.000 --> 00:02.000\nfirst\n\nNOTE between cues\n\n00:03.000 --> 00:04.000\nsecond\n",
        );
        assert_eq!(begin_ms(&doc), vec![1000, 3000]);
    }

    #[test]
    fn test_identifier_line_detected_in_preamble() {
        let doc = parse("WEBVTT - title\n\nintro\n00:01.000 --> 00:02.000\nhello\n");
        assert_eq!(doc.cues.len(), 1);
        assert_eq!(doc.cues[0].identifier(), Some("intro"));
    }

    #[test]
    fn test_stray_line_keeps_next_cue() {
        let doc = parse("WEBVTT\n\n00:01.000 --> 00:02.000\nfirst\n\norphan\n\n00:03.000 --> 00:04.000\nsecond\n");
        assert_eq!(begin_ms(&doc), vec![1000, 3000]);
        assert_eq!(doc.cues[1].lines(), ["second"]);
    }

    #[test]
    fn test_huge_hours_skip_only_that_cue() {
        let doc = parse(
            "WEBVTT\n\n00:01.000 --> 00:02.000\nfirst\n\n9999999999999999:00:00.000 --> 9999999999999999:00:01.000\nhuge\n\n00:03.000 --> 00:04.000\nlast\n",
        );
        assert_eq!(begin_ms(&doc), vec![1000, 3000]);
    }

    #[test]
    fn test_empty_interval_dropped() {
        let doc = parse("WEBVTT\n\n00:05.000 --> 00:05.000\nnever\n\n00:06.000 --> 00:05.000\nbackwards\n\n00:07.000 --> 00:08.000\nok\n");
        assert_eq!(begin_ms(&doc), vec![7000]);
    }

    #[test]
    fn test_cue_without_text() {
        let doc = parse("WEBVTT\n\n00:01.000 --> 00:02.000\n\n");
        assert_eq!(doc.cues.len(), 1);
        assert!(doc.cues[0].lines().is_empty());
    }

    #[test]
    fn test_header_only_document() {
        let doc = parse("WEBVTT\n\nNOTE nothing here\n");
        assert!(doc.cues.is_empty());
        assert!(doc.regions.is_empty());
    }

    #[test]
    fn test_bad_settings_keep_cue() {
        let doc = parse("WEBVTT\n\n00:01.000 --> 00:02.000 align:wibble line:100%,end\ntext\n");
        assert_eq!(doc.cues.len(), 1);
        let b = doc.cues[0].cue_box();
        assert_eq!(b.line, Some(10000));
        assert_eq!(b.line_align, LineAlign::End);
        assert_eq!(b.text_align, Align::Center);
    }
}
