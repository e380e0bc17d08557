

#[cfg(test)]
mod intake_tests;

#[cfg(test)]
mod assignment_tests;

#[cfg(test)]
mod decision_tests;

#[cfg(test)]
mod query_tests;

#[cfg(test)]
mod scenario_tests;
