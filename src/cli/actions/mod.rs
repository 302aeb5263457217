pub mod eval;

#[derive(Debug)]
pub enum Action {
    Evaluate {
        subject: String,
        policy_name: Option<String>,
    },
}
