//! Tests for REPL prompt handling.

use ragchat_cli::repl::PromptInterrupts;

#[test]
fn second_interrupt_exits() {
    let mut interrupts = PromptInterrupts::default();
    assert!(!interrupts.press());
    assert!(interrupts.press());
}

#[test]
fn input_between_interrupts_keeps_running() {
    let mut interrupts = PromptInterrupts::default();
    assert!(!interrupts.press());
    interrupts.clear();
    assert!(!interrupts.press());
}
