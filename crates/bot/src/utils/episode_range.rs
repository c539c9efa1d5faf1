/// Condense episode numbers into range notation.
///
/// `[1, 2, 3, 5, 6]` becomes `"E1-E3, E5-E6"`, a single episode stays
/// `"E4"`, an empty slice yields `""`. Input is normalized (sorted,
/// deduplicated) first.
pub fn condense_episodes(numbers: &[i32]) -> String {
    let mut numbers = numbers.to_vec();
    numbers.sort_unstable();
    numbers.dedup();

    let mut ranges: Vec<String> = Vec::new();
    let mut iter = numbers.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut start = first;
    let mut end = first;
    for n in iter {
        if n == end + 1 {
            end = n;
        } else {
            ranges.push(format_range(start, end));
            start = n;
            end = n;
        }
    }
    ranges.push(format_range(start, end));

    ranges.join(", ")
}

fn format_range(start: i32, end: i32) -> String {
    if start == end {
        format!("E{}", start)
    } else {
        format!("E{}-E{}", start, end)
    }
}
