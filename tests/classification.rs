use quakemap::{color, radius, Legend, MagnitudeBucket, LEGEND_GRADES};

#[test]
fn test_color_ladder_boundaries() {
    let cases = [
        (-1.0, MagnitudeBucket::C1),
        (0.0, MagnitudeBucket::C1),
        (2.0, MagnitudeBucket::C1),
        (2.0001, MagnitudeBucket::C2),
        (4.0, MagnitudeBucket::C2),
        (4.5, MagnitudeBucket::C3),
        (6.0, MagnitudeBucket::C3),
        (7.9, MagnitudeBucket::C4),
        (8.0, MagnitudeBucket::C4),
        (8.0001, MagnitudeBucket::C5),
        (12.0, MagnitudeBucket::C5),
        (f64::NAN, MagnitudeBucket::C1),
    ];
    for (mag, expected) in cases {
        assert_eq!(color(mag), expected, "magnitude {}", mag);
    }
}

#[test]
fn test_every_magnitude_has_exactly_one_bucket() {
    let mut mag = -2.0;
    while mag <= 10.0 {
        let bucket = color(mag);
        let matches = MagnitudeBucket::ALL.iter().filter(|b| **b == bucket).count();
        assert_eq!(matches, 1);
        mag += 0.25;
    }
}

#[test]
fn test_radius_is_linear_and_unclamped() {
    assert_eq!(radius(0.0), 0.0);
    assert_eq!(radius(-1.0), -5.0);
    assert_eq!(radius(3.0), 15.0);
    assert_eq!(radius(9.0), 45.0);
}

#[test]
fn test_legend_agrees_with_markers() {
    let legend = Legend::new();
    assert_eq!(legend.entries().len(), LEGEND_GRADES.len());
    for (entry, grade) in legend.entries().iter().zip(LEGEND_GRADES) {
        assert_eq!(entry.grade, grade);
        assert_eq!(entry.bucket, color(grade + 1.0));
    }
    assert_eq!(legend.entries()[0].bucket.hex(), "#74a9cf");
    assert_eq!(legend.entries()[4].bucket.hex(), "#b30000");
    assert_eq!(legend.entries()[4].label, "8+");
}
