use std::cell::RefCell;

use anyhow::Context;
use comfy_table::Table;
use log::debug;
use num_format::{Locale, ToFormattedString};
use pmc::{
    measure, MeasureOptions, Measurement, MsrChannel, ProcessorIdentity, ThreadMeasurement,
    OVERHEAD_REPETITIONS,
};

// counters set up when none are named on the command line: core cycles,
// instructions, uops, data cache misses
const DEFAULT_COUNTERS: [u16; 4] = [1, 9, 100, 310];

const USER_DATA_SIZE: usize = 1000;

thread_local! {
    static USER_DATA: RefCell<Vec<i32>> = RefCell::new(vec![1; USER_DATA_SIZE]);
}

fn workload(_thread: usize) {
    USER_DATA.with(|data| {
        let mut data = data.borrow_mut();
        for v in data.iter_mut() {
            *v = v.wrapping_mul(99);
        }
        std::hint::black_box(&mut *data);
    });
}

pub fn run(
    threads: usize,
    repetitions: usize,
    counters: Vec<u16>,
    no_pmc: bool,
    ratio: Option<String>,
) -> anyhow::Result<()> {
    let identity = ProcessorIdentity::host();
    debug!(
        "vendor {:?}, scheme {:#x}, {} general + {} fixed pmcs",
        identity.vendor,
        identity.scheme.bits(),
        identity.general_pmcs,
        identity.fixed_pmcs
    );

    let counter_ids = if no_pmc {
        Vec::new()
    } else if counters.is_empty() {
        DEFAULT_COUNTERS.to_vec()
    } else {
        counters
    };
    let ratio = ratio.as_deref().map(RatioColumn::parse).transpose()?;

    let channel = open_channel(&counter_ids)?;
    let options = MeasureOptions {
        threads,
        repetitions,
        overhead_repetitions: OVERHEAD_REPETITIONS,
        counter_ids,
    };
    let measurement = measure(&identity, channel.as_deref(), &options, workload)?;
    report(&measurement, ratio.as_ref());
    Ok(())
}

fn open_channel(counter_ids: &[u16]) -> anyhow::Result<Option<Box<dyn MsrChannel>>> {
    if counter_ids.iter().all(|&id| id == 0) {
        return Ok(None);
    }
    #[cfg(target_os = "linux")]
    {
        let channel = pmc::DevMsrChannel::open()
            .context("performance counters requested but the MSR driver is not loaded")?;
        Ok(Some(Box::new(channel)))
    }
    #[cfg(not(target_os = "linux"))]
    {
        anyhow::bail!("performance counter access needs the Linux MSR driver; rerun with --no-pmc")
    }
}

fn report(measurement: &Measurement, ratio: Option<&RatioColumn>) {
    for thread in &measurement.threads {
        println!("\nProcessor {}", thread.processor);
        let mut table = Table::new();
        let mut header: Vec<String> = vec!["Clock".to_string()];
        header.extend(measurement.counter_names.iter().map(|n| n.to_string()));
        if ratio.is_some() {
            header.push("Ratio".to_string());
        }
        table.set_header(header);

        for rep in 0..thread.clock.len() {
            let mut row = vec![thread.clock[rep].to_formatted_string(&Locale::en)];
            for counts in &thread.counters {
                row.push(counts[rep].to_formatted_string(&Locale::en));
            }
            if let Some(ratio) = ratio {
                row.push(ratio.format(thread, rep));
            }
            table.add_row(row);
        }
        println!("{table}");
    }
}

/// Optional column showing `factor * a / b` where column 0 is the clock and
/// column i is the i-th configured counter.
struct RatioColumn {
    numerator: usize,
    denominator: usize,
    factor: f64,
}

impl RatioColumn {
    fn parse(spec: &str) -> anyhow::Result<RatioColumn> {
        let parts: Vec<&str> = spec.split(':').collect();
        anyhow::ensure!(
            parts.len() == 2 || parts.len() == 3,
            "ratio must be NUM:DEN[:FACTOR]"
        );
        Ok(RatioColumn {
            numerator: parts[0].parse().context("ratio numerator")?,
            denominator: parts[1].parse().context("ratio denominator")?,
            factor: if parts.len() == 3 {
                parts[2].parse().context("ratio factor")?
            } else {
                1.0
            },
        })
    }

    fn column(thread: &ThreadMeasurement, index: usize, rep: usize) -> i64 {
        if index == 0 {
            thread.clock[rep]
        } else {
            // out-of-range columns contribute a neutral 1
            thread
                .counters
                .get(index - 1)
                .map(|counts| counts[rep])
                .unwrap_or(1)
        }
    }

    fn format(&self, thread: &ThreadMeasurement, rep: usize) -> String {
        let a = Self::column(thread, self.numerator, rep);
        let b = Self::column(thread, self.denominator, rep);
        if b == 0 {
            "inf".to_string()
        } else {
            format!("{:.6}", self.factor * a as f64 / b as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> ThreadMeasurement {
        ThreadMeasurement {
            processor: 0,
            clock: vec![100, 50],
            counters: vec![vec![200, 0]],
        }
    }

    #[test]
    fn parses_two_and_three_part_specs() {
        let r = RatioColumn::parse("1:0").unwrap();
        assert_eq!((r.numerator, r.denominator), (1, 0));
        assert_eq!(r.factor, 1.0);
        let r = RatioColumn::parse("0:1:2.5").unwrap();
        assert_eq!(r.factor, 2.5);
        assert!(RatioColumn::parse("1").is_err());
    }

    #[test]
    fn divides_counter_by_clock() {
        let r = RatioColumn::parse("1:0").unwrap();
        assert_eq!(r.format(&thread(), 0), "2.000000");
    }

    #[test]
    fn zero_denominator_prints_inf() {
        let r = RatioColumn::parse("0:1").unwrap();
        assert_eq!(r.format(&thread(), 1), "inf");
    }

    #[test]
    fn out_of_range_column_is_neutral() {
        let r = RatioColumn::parse("5:0").unwrap();
        assert_eq!(r.format(&thread(), 0), "0.010000");
    }
}
