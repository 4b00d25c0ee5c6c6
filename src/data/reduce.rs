/// Running mean of a reward trace: element `i` is the mean of
/// `reward[0..=i]`.
///
/// A NaN at position `i` makes every later average NaN.
pub fn cumulative_average(reward: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    reward
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            sum += r;
            sum / (i + 1) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_prefixes() {
        assert_eq!(
            cumulative_average(&[2.0, 4.0, 6.0, 0.0]),
            vec![2.0, 3.0, 4.0, 3.0]
        );
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(cumulative_average(&[]).is_empty());
    }

    #[test]
    fn single_value_is_itself() {
        assert_eq!(cumulative_average(&[-1.5]), vec![-1.5]);
    }

    #[test]
    fn nan_propagates_forward() {
        let avg = cumulative_average(&[1.0, f64::NAN, 3.0]);
        assert_eq!(avg[0], 1.0);
        assert!(avg[1].is_nan());
        assert!(avg[2].is_nan());
    }
}
