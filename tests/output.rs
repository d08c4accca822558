use missions::output::{progress_bar, Report};

#[test]
fn report_renders_every_part() {
    let mut report = Report::new("missions complete: task 1 (+4 coins)");
    report
        .fact("coins", 4)
        .fact("proof", "study.png")
        .line("[x] 1. Study for an hour (4 coins)")
        .warn("event not recorded: disk full")
        .hint("missions rewards");

    assert_eq!(
        report.render(),
        "missions complete: task 1 (+4 coins)\n  coins: 4\n  proof: study.png\n\n  [x] 1. Study for an hour (4 coins)\nwarning: event not recorded: disk full\nnext: missions rewards"
    );
}

#[test]
fn bare_report_is_just_the_title() {
    let report = Report::new("missions logout: no saved login");
    assert_eq!(report.render(), "missions logout: no saved login");
}

#[test]
fn progress_bar_fills_proportionally() {
    assert_eq!(progress_bar(0, 10), "[..........] 0%");
    assert_eq!(progress_bar(50, 10), "[#####.....] 50%");
    assert_eq!(progress_bar(18, 10), "[#.........] 18%");
    assert_eq!(progress_bar(100, 4), "[####] 100%");
}
