pub mod books;

use bookstore_kernel::SeedPlan;

/// Register all project-specific steps with the plan
pub fn register_all(plan: &mut SeedPlan) {
    books::register(plan);
}
