use bucket_table::BucketTable;
use bucket_table::Primitive;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "initial_capacity", default_value_t = 1024)]
    initial_capacity: usize,

    #[arg(short = 'n', long = "num_values", default_value_t = 500_000)]
    num_values: u32,

    /// Number of keys to remove after filling, spread evenly over the range.
    #[arg(short = 'r', long = "num_removals", default_value_t = 0)]
    num_removals: u32,
}

fn make_bar(count: usize, max: usize) -> String {
    const MAX_BAR: usize = 60;

    if count == 0 || max == 0 {
        return String::new();
    }
    let units = (count as u128 * (MAX_BAR * 8) as u128).div_ceil(max as u128) as usize;
    let mut bar = "█".repeat(units / 8);
    let partial = match units % 8 {
        1 => Some('▏'),
        2 => Some('▎'),
        3 => Some('▍'),
        4 => Some('▌'),
        5 => Some('▋'),
        6 => Some('▊'),
        7 => Some('▉'),
        _ => None,
    };
    bar.extend(partial);
    bar
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!(
        "Creating BucketTable with initial capacity: {}",
        args.initial_capacity
    );
    let banner = Primitive::from("this is a test of the system...");
    let mut table: BucketTable<'_, Primitive> = BucketTable::with_capacity(args.initial_capacity);
    if let Err(err) = table.set("test", &banner) {
        eprintln!("failed to insert banner: {err}");
    }

    println!("Filling table with {} integer values...", args.num_values);
    let mut failures = 0;
    for i in 0..args.num_values {
        if let Err(err) = table.set_int(i.to_string(), (i as i32).wrapping_mul(3)) {
            eprintln!("failed to insert {i}: {err}");
            failures += 1;
        }
    }

    if args.num_removals > 0 {
        let step = (args.num_values / args.num_removals).max(1);
        let removed = (0..args.num_values)
            .step_by(step as usize)
            .take(args.num_removals as usize)
            .filter(|i| table.remove(i.to_string()).is_some())
            .count();
        println!("Removed {removed} values");
    }

    let missing = (0..args.num_values)
        .filter(|i| table.get(i.to_string()).is_none())
        .count();

    println!("Inserted {} values ({failures} failures)", table.len());
    println!("Values not found on read-back: {missing}");
    println!("Final fullness: {:.2}%", table.fullness_percent());
    println!(
        "key: test\tvalue: {}",
        table
            .get("test")
            .and_then(Primitive::as_str)
            .unwrap_or("<missing>")
    );

    let histogram = table.probe_histogram();
    let max = histogram.iter().copied().max().unwrap_or(0);
    println!("probe histogram ({} entries):", table.len());
    for (i, &count) in histogram.iter().enumerate() {
        println!("{:>3} | {} ({})", i + 1, make_bar(count, max), count);
    }

    table.stats().print();
}
