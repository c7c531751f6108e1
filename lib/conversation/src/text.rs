//! Menu labels and reply copy.

use meetup_concierge_content::{Program, Talk};

pub const PROGRAM: &str = "Program";
pub const ASK_QUESTION: &str = "Ask a question";
pub const MAIN_MENU: &str = "Main menu";
pub const BACK: &str = "Back";

pub const START_COMMAND: &str = "start";
pub const CANCEL_COMMAND: &str = "cancel";

pub(crate) const GREETING: &str = "Hello! This is the official meetup bot.\n\n\
    Here you can browse today's programs and their schedules, \
    and ask a speaker a question!";
pub(crate) const CHOOSE_FROM_OPTIONS: &str = "Please choose one of the options below.";
pub(crate) const SEND_START: &str = "Send /start to open the menu.";
pub(crate) const CANCELLED: &str = "Action cancelled.";
pub(crate) const NO_PROGRAMS: &str = "There are no programs scheduled yet.";
pub(crate) const WHICH_PROGRAM_QUESTION: &str = "Which program's speaker do you have a question for?";
pub(crate) const WHEN_WAS_TALK: &str = "When was the talk?";
pub(crate) const ASK_YOUR_QUESTION: &str = "Ask your question:";
pub(crate) const EXIT_DESCRIPTION: &str = "Go back to the schedule or to the main menu.";

pub(crate) fn program_listing(programs: &[Program]) -> String {
    if programs.is_empty() {
        return NO_PROGRAMS.to_string();
    }
    let lines: String = programs
        .iter()
        .enumerate()
        .map(|(index, program)| {
            format!(
                "{}. {} ({})\n",
                index + 1,
                program.name,
                program.event_date.format("%d.%m.%Y")
            )
        })
        .collect();
    format!("Today we have the following programs:\n\n{lines}\nWhich program interests you?")
}

pub(crate) fn talk_listing(program: &str, talks: &[Talk]) -> String {
    if talks.is_empty() {
        return format!("No talks are scheduled for «{program}» yet.");
    }
    let entries: String = talks
        .iter()
        .enumerate()
        .map(|(index, talk)| format!("{}. {}\nTime: {}\n\n", index + 1, talk.name, talk.time_label()))
        .collect();
    format!(
        "Program «{program}» has the following talks:\n\n{entries}\
         Which talk would you like to know more about?"
    )
}

pub(crate) fn talk_description(talk: &Talk) -> String {
    format!(
        "Talk description: {}\n\nSpeaker: {}",
        talk.description, talk.speaker.full_name
    )
}

pub(crate) fn speaker_at(program: &str, talk: &Talk) -> String {
    format!(
        "At «{program}» at {} the speaker was:\n\n{}",
        talk.time_label(),
        talk.speaker.full_name
    )
}

pub(crate) fn question_accepted(speaker: &str) -> String {
    format!("Thank you! Your question has been passed to {speaker}.")
}

pub(crate) fn speaker_notice(body: &str) -> String {
    format!("New question from a meetup attendee:\n\n{body}")
}
