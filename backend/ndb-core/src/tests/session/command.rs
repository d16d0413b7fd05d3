use crate::session::command::Command;

#[test]
fn given_blank_lines_when_parsed_then_empty() {
    assert_eq!(Command::parse(""), Command::Empty);
    assert_eq!(Command::parse("   \t  "), Command::Empty);
    assert_eq!(Command::parse("\n"), Command::Empty);
}

#[test]
fn given_sources_when_parsed_then_all_flag_is_detected_anywhere() {
    assert_eq!(Command::parse("sources"), Command::Sources { all: false });
    assert_eq!(Command::parse("sources --all"), Command::Sources { all: true });
    assert_eq!(
        Command::parse("  sources   extra --all  "),
        Command::Sources { all: true }
    );
    assert_eq!(Command::parse("sources -a"), Command::Sources { all: false });
}

#[test]
fn given_exit_when_parsed_then_exit_regardless_of_arguments() {
    assert_eq!(Command::parse("exit"), Command::Exit);
    assert_eq!(Command::parse("exit now"), Command::Exit);
}

#[test]
fn given_unrecognized_name_when_parsed_then_unknown_keeps_name() {
    assert_eq!(
        Command::parse("break main.js:13"),
        Command::Unknown(String::from("break"))
    );
    assert_eq!(
        Command::parse("Sources"),
        Command::Unknown(String::from("Sources"))
    );
}
