//! Behaviour tests for the board services live under `tests/`.
