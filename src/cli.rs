use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{App, Arg};
use log::{debug, info};

use crate::config::Config;
use crate::source::base::{CaptionSource, VideoDetails, VideoSearch};
use crate::source::timedtext::TimedTextQuery;
use crate::youtube::YoutubeQuery;

/// Ask for the genre interactively. Only the line ending is stripped
fn prompt_genre<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<String> {
    write!(output, "Enter the genre: ")?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Err(anyhow::anyhow!("No genre entered"));
    }
    Ok(line.trim_end_matches(&['\n', '\r'][..]).to_string())
}

/// Search for videos in genre, look up their details and captions, and save
/// the lot as CSV in `output_dir`
fn fetch<S, D, C>(
    genre: &str,
    max_results: usize,
    search: &S,
    details: &D,
    captions: &C,
    output_dir: &Path,
) -> Result<PathBuf>
where
    S: VideoSearch,
    D: VideoDetails,
    C: CaptionSource,
{
    println!("Fetching videos for genre: {}", genre);
    let items = search.search(genre, max_results)?;
    println!("Found {} videos", items.len());

    let records = crate::record::assemble(&items, details, captions)?;
    info!(
        "Got details for {} of {} videos",
        records.len(),
        items.len()
    );

    let path = crate::export::save(genre, &records, output_dir)?;
    println!("Data saved to {}", path.display());
    Ok(path)
}

/// Run the whole pipeline against Youtube
fn fetch_youtube(genre: &str, cfg: &Config) -> Result<PathBuf> {
    let yt = YoutubeQuery::new(cfg);
    let tt = TimedTextQuery::new(cfg);
    fetch(genre, cfg.max_results, &yt, &yt, &tt, &cfg.output_dir)
}

fn config_logging(verbosity: u64) -> Result<()> {
    // Level for this application
    let internal_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,  // -v
        2 => log::LevelFilter::Debug, // -vv
        _ => log::LevelFilter::Trace, // -vvv
    };

    // Show log output for 3rd party library at -vvv
    let thirdparty_level = match verbosity {
        0..=2 => log::LevelFilter::Warn,
        _ => log::LevelFilter::Debug, // -vvv
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(thirdparty_level)
        .level_for("vidcsv", internal_level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}

pub fn main() -> Result<()> {
    let app = App::new("vidcsv")
        .about("Search Youtube for videos in a genre and save their details as CSV")
        .arg(
            Arg::with_name("genre")
                .help("Genre to search for. Asked for interactively if not given"),
        )
        .arg(
            Arg::with_name("max-results")
                .short("n")
                .long("max-results")
                .takes_value(true)
                .value_name("N")
                .help("Most videos to fetch (default 500)"),
        )
        .arg(
            Arg::with_name("lang")
                .short("l")
                .long("lang")
                .takes_value(true)
                .help("Caption language code (default en)"),
        )
        .arg(
            Arg::with_name("output-dir")
                .short("o")
                .long("output-dir")
                .takes_value(true)
                .help("Directory to write the CSV file in"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .takes_value(false),
        );

    // Parse
    let app_m = app.get_matches();

    // Logging levels
    let verbosity = app_m.occurrences_of("verbose");
    config_logging(verbosity)?;

    debug!("Loading config");
    let mut cfg = Config::load()?;
    if let Some(n) = app_m.value_of("max-results") {
        cfg.max_results = n
            .parse::<usize>()
            .with_context(|| format!("Invalid --max-results value {:?}", n))?;
    }
    if let Some(lang) = app_m.value_of("lang") {
        cfg.caption_lang = lang.into();
    }
    if let Some(dir) = app_m.value_of("output-dir") {
        cfg.output_dir = dir.into();
    }

    let genre = match app_m.value_of("genre") {
        Some(g) => g.to_string(),
        None => {
            let stdin = std::io::stdin();
            prompt_genre(stdin.lock(), std::io::stdout())?
        }
    };

    fetch_youtube(&genre, &cfg)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn video_json(id: &str, title: &str) -> serde_json::Value {
        json!({
            "kind": "youtube#video",
            "id": id,
            "snippet": {
                "publishedAt": "2020-02-03T04:05:06Z",
                "title": title,
                "description": "A long one, recorded in one take",
                "channelTitle": "Blue Note",
                "tags": ["jazz", "saxophone"],
                "categoryId": "10"
            },
            "contentDetails": {"duration": "PT7M30S"},
            "statistics": {"viewCount": "99", "commentCount": "4"},
            "topicDetails": {"topicCategories": ["https://en.wikipedia.org/wiki/Jazz"]}
        })
    }

    #[test]
    fn test_prompt_genre() -> Result<()> {
        let mut shown: Vec<u8> = vec![];
        let genre = prompt_genre("jazz\n".as_bytes(), &mut shown)?;
        assert_eq!(genre, "jazz");
        assert_eq!(String::from_utf8(shown)?, "Enter the genre: ");

        assert_eq!(
            prompt_genre("lo-fi hip hop\r\n".as_bytes(), std::io::sink())?,
            "lo-fi hip hop"
        );
        // Otherwise used verbatim
        assert_eq!(
            prompt_genre("  spaced out  \n".as_bytes(), std::io::sink())?,
            "  spaced out  "
        );
        // No trailing newline at EOF
        assert_eq!(prompt_genre("funk".as_bytes(), std::io::sink())?, "funk");
        Ok(())
    }

    #[test]
    fn test_prompt_genre_eof() {
        assert!(prompt_genre("".as_bytes(), std::io::sink()).is_err());
    }

    #[test]
    fn test_fetch_jazz() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut server = mockito::Server::new();
        let m_search = server
            .mock("GET", "/youtube/v3/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "jazz".into()),
                Matcher::UrlEncoded("maxResults".into(), "50".into()),
            ]))
            .with_body(
                json!({
                    "items": [
                        {"id": {"kind": "youtube#video", "videoId": "jz1"}, "snippet": {"title": "One"}},
                        {"id": {"kind": "youtube#video", "videoId": "jz2"}, "snippet": {"title": "Two"}}
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create();
        let m_videos = server
            .mock("GET", "/youtube/v3/videos")
            .match_query(Matcher::UrlEncoded("id".into(), "jz1,jz2".into()))
            .with_body(
                json!({"items": [video_json("jz1", "One"), video_json("jz2", "Two")]}).to_string(),
            )
            .expect(1)
            .create();
        let m_cap1 = server
            .mock("GET", "/api/timedtext")
            .match_query(Matcher::UrlEncoded("v".into(), "jz1".into()))
            .with_body("<transcript><text start=\"1\">Take five</text></transcript>")
            .expect(1)
            .create();
        let m_cap2 = server
            .mock("GET", "/api/timedtext")
            .match_query(Matcher::UrlEncoded("v".into(), "jz2".into()))
            .with_status(500)
            .expect(1)
            .create();

        let tmp = tempfile::tempdir()?;
        let cfg = Config::for_test(&server.url(), tmp.path());
        let path = fetch_youtube("jazz", &cfg)?;

        m_search.assert();
        m_videos.assert();
        m_cap1.assert();
        m_cap2.assert();

        assert_eq!(path, tmp.path().join("videos_jazz.csv"));
        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text.lines().count(), 3);

        let mut rdr = csv::Reader::from_path(&path)?;
        let rows: Vec<csv::StringRecord> = rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        assert_eq!(rows.len(), 2);

        assert_eq!(&rows[0][0], "https://www.youtube.com/watch?v=jz1");
        assert_eq!(&rows[0][1], "One");
        assert_eq!(&rows[0][2], "A long one, recorded in one take");
        assert_eq!(&rows[0][4], "jazz, saxophone");
        assert_eq!(&rows[0][11], "true");
        assert_eq!(
            &rows[0][12],
            "<transcript><text start=\"1\">Take five</text></transcript>"
        );
        assert_eq!(&rows[0][13], "N/A");

        assert_eq!(&rows[1][0], "https://www.youtube.com/watch?v=jz2");
        assert_eq!(&rows[1][11], "false");
        assert_eq!(&rows[1][12], "N/A");
        Ok(())
    }

    #[test]
    fn test_fetch_search_failure_writes_nothing() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/youtube/v3/search")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(json!({"error": {"code": 400, "message": "API key not valid"}}).to_string())
            .create();

        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::for_test(&server.url(), tmp.path());
        assert!(fetch_youtube("jazz", &cfg).is_err());
        assert!(!tmp.path().join("videos_jazz.csv").exists());
    }
}
