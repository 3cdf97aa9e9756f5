mod harness;

mod fixtures {
    mod balancing;
    mod css_filtering;
    mod sanitization;
}
