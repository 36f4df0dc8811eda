//! Segment a short recorded track with a pause and a session change.
//!
//! Run with: cargo run --example segment_track

use track_segmenter::{read_segments, DiagnosticLog, RawRow, RowQuery};

fn main() {
    // What a recorder on protocol version 2 would return, before filtering
    let stored = vec![
        RawRow::from_degrees(1, 1, 51.5074, -0.1278, Some(0)).with_motion(3.1, 21.0, 1_700_000_000_000),
        RawRow::from_degrees(2, 1, 51.5080, -0.1290, Some(0)).with_motion(3.4, 22.5, 1_700_000_005_000),
        RawRow::from_degrees(3, 1, 100.0, 0.0, Some(3)).with_motion(0.0, 22.5, 1_700_000_010_000),
        RawRow::from_degrees(4, 1, 51.5090, -0.1300, Some(0)).with_motion(2.9, 23.0, 1_700_000_060_000),
        RawRow::from_degrees(5, 1, 95.0, 0.0, Some(0)).with_motion(2.9, 23.0, 1_700_000_065_000),
        RawRow::from_degrees(6, 1, 51.5095, -0.1305, Some(2)).with_motion(2.8, 23.1, 1_700_000_066_000),
        RawRow::from_degrees(7, 2, 40.7128, -74.0060, Some(0)).with_motion(1.2, 10.0, 1_700_100_000_000),
        RawRow::from_degrees(8, 2, 40.7138, -74.0070, Some(1)).with_motion(1.3, 10.5, 1_700_100_005_000),
    ];

    let query = RowQuery::new(2, 0);
    println!("Query: SELECT {} WHERE {}\n", query.projection().join(", "), query.selection());

    let rows = query.filter(stored.iter().copied()).map(Ok::<_, std::io::Error>);
    let mut log = DiagnosticLog::new();
    let result = match read_segments(rows, 2, 0, &mut log) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Segmentation failed: {}", e);
            return;
        }
    };

    let stats = result.stats();
    println!(
        "Received {} rows: {} invalid, {} paused, {} segments\n",
        stats.received, stats.invalid, stats.paused, stats.segment_count
    );

    for (i, segment) in result.segments().iter().enumerate() {
        println!(
            "Segment {} (session {:?}): {} points, {:.0}m",
            i + 1,
            segment.session_id(),
            segment.len(),
            segment.length_meters()
        );
        for point in segment.points() {
            println!("   {}{}", point, if point.is_bridge { " [bridge]" } else { "" });
        }
    }

    println!("\nSpeed samples:");
    for entry in log.speed_time_entries() {
        println!("   {:>4.1} m/s at {}", entry.speed, entry.time);
    }

    println!("\nNext read resumes after row {}", result.last_row_id());
}
