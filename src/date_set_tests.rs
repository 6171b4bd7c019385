// src/date_set_tests.rs

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::super::date_set::{build_date_set, format_days, week_bounds, DaySelection};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2024-06-12 is a Wednesday; its Sunday-start week runs 06-09 .. 06-15.
    const REF_Y: i32 = 2024;
    const REF_M: u32 = 6;
    const REF_D: u32 = 12;

    fn reference() -> NaiveDate {
        d(REF_Y, REF_M, REF_D)
    }

    #[test]
    fn test_week_bounds_sunday_start() {
        let (sunday, saturday) = week_bounds(reference());
        assert_eq!(sunday, d(2024, 6, 9));
        assert_eq!(saturday, d(2024, 6, 15));

        // A Sunday is its own week start
        let (sunday, saturday) = week_bounds(d(2024, 6, 9));
        assert_eq!(sunday, d(2024, 6, 9));
        assert_eq!(saturday, d(2024, 6, 15));
    }

    #[test]
    fn test_empty_selection_yields_empty_set() {
        let days = build_date_set(&DaySelection::default(), &[], reference());
        assert!(days.is_empty());
    }

    #[test]
    fn test_explicit_dates_are_deduplicated_and_sorted() {
        let explicit = vec![d(2024, 6, 20), d(2024, 6, 5), d(2024, 6, 20), d(2024, 6, 5)];
        let days = build_date_set(&DaySelection::default(), &explicit, reference());
        assert_eq!(days, vec![d(2024, 6, 5), d(2024, 6, 20)]);
    }

    #[test]
    fn test_flag_and_explicit_overlap_is_deduplicated() {
        let selection = DaySelection {
            this_week: true,
            ..Default::default()
        };
        // 06-10 falls inside the expanded week; it must appear exactly once
        let days = build_date_set(&selection, &[d(2024, 6, 10)], reference());
        let expected: Vec<NaiveDate> = (9..=15).map(|day| d(2024, 6, day)).collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn test_weekend_only_alone_yields_weekend_of_week() {
        let selection = DaySelection {
            weekend_only: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], reference());
        assert_eq!(days, vec![d(2024, 6, 9), d(2024, 6, 15)]);
    }

    #[test]
    fn test_this_week_expands_to_all_seven_days() {
        let selection = DaySelection {
            this_week: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], reference());
        let expected: Vec<NaiveDate> = (9..=15).map(|day| d(2024, 6, day)).collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn test_this_week_with_weekend_only_narrows_to_weekend() {
        let selection = DaySelection {
            this_week: true,
            weekend_only: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], reference());
        assert_eq!(days, vec![d(2024, 6, 9), d(2024, 6, 15)]);
    }

    #[test]
    fn test_current_day_is_exempt_from_weekend_filter() {
        // 2024-06-12 is a weekday, but the current-day toggle always wins
        let selection = DaySelection {
            current_day: true,
            weekend_only: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], reference());
        assert_eq!(days, vec![reference()]);
    }

    #[test]
    fn test_this_month_expands_to_full_month() {
        let selection = DaySelection {
            this_month: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], reference());
        assert_eq!(days.len(), 30);
        assert_eq!(days.first(), Some(&d(2024, 6, 1)));
        assert_eq!(days.last(), Some(&d(2024, 6, 30)));
    }

    #[test]
    fn test_this_month_weekend_only_yields_exact_weekends_of_june_2024() {
        let selection = DaySelection {
            this_month: true,
            weekend_only: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], reference());
        let expected: Vec<NaiveDate> = [1, 2, 8, 9, 15, 16, 22, 23, 29, 30]
            .iter()
            .map(|&day| d(2024, 6, day))
            .collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn test_combined_flags_stay_deduplicated() {
        // Reference day sits inside its own week; combining the toggles must
        // not produce it twice
        let selection = DaySelection {
            current_day: true,
            this_week: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], reference());
        let expected: Vec<NaiveDate> = (9..=15).map(|day| d(2024, 6, day)).collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn test_month_expansion_across_year_boundary_week() {
        // December 2024: weekend filter keeps only Sat/Sun rows
        let selection = DaySelection {
            this_month: true,
            weekend_only: true,
            ..Default::default()
        };
        let days = build_date_set(&selection, &[], d(2024, 12, 31));
        let expected: Vec<NaiveDate> = [1, 7, 8, 14, 15, 21, 22, 28, 29]
            .iter()
            .map(|&day| d(2024, 12, day))
            .collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn test_format_days_matches_backend_shape() {
        let formatted = format_days(&[d(2024, 6, 9), d(2024, 6, 15)]);
        assert_eq!(formatted, vec!["2024-06-09", "2024-06-15"]);
    }
}
