use rust_fsm::{StateMachine, StateMachineImpl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Complete,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunInput {
    Start,
    Finish,
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutput {
    Started,
    Completed,
    Released,
}

/// `Idle -> Running -> Complete`, with teardown cancelling any run that has
/// not yet completed.
#[derive(Debug)]
pub struct RunLifecycle;

pub type Lifecycle = StateMachine<RunLifecycle>;

impl StateMachineImpl for RunLifecycle {
    type Input = RunInput;
    type State = RunState;
    type Output = RunOutput;
    const INITIAL_STATE: Self::State = RunState::Idle;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            (RunState::Idle, RunInput::Start) => Some(RunState::Running),
            (RunState::Running, RunInput::Finish) => Some(RunState::Complete),
            (RunState::Idle | RunState::Running, RunInput::Teardown) => Some(RunState::Cancelled),
            _ => None,
        }
    }

    fn output(state: &Self::State, input: &Self::Input) -> Option<Self::Output> {
        match (state, input) {
            (RunState::Idle, RunInput::Start) => Some(RunOutput::Started),
            (RunState::Running, RunInput::Finish) => Some(RunOutput::Completed),
            (RunState::Idle | RunState::Running, RunInput::Teardown) => Some(RunOutput::Released),
            _ => None,
        }
    }
}
