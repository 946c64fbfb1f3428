use crate::support::{EXIT_REJECTED, print_json, read_json_file_or_exit, yes_no};
use skyknit_checker::simulate_component;
use skyknit_schemas::ComponentIR;

pub fn run(ir: String, json_output: bool) {
    let component: ComponentIR = read_json_file_or_exit(&ir, "component IR");
    let result = simulate_component(&component);

    if json_output {
        print_json(&result, "simulate");
    } else {
        let state = &result.final_state;
        println!("skyknit simulate");
        println!("  Component: {}", result.component_name);
        println!("  Operations applied: {}", state.operations_applied);
        println!("  Rows: {}", state.row_counter);
        println!("  Live stitches: {}", state.live_stitch_count);
        println!("  Held stitches: {}", state.total_held());
        println!("  Passed: {}", yes_no(result.passed));
        for error in &result.errors {
            println!("    - {error}");
        }
    }
    if !result.passed {
        std::process::exit(EXIT_REJECTED);
    }
}
